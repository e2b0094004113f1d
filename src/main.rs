//! Command-line entry point of rbackup

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    // Spotify credentials may live in a local .env file
    dotenvy::dotenv().ok();

    cli::run().await?;
    Ok(())
}
