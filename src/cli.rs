use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rbackup::clients::{SpotifyClient, errors::Result};
use rbackup::fetcher::{ConfigBuilder, FetchMode, LibraryFetcher};
use rbackup::table::LibraryTable;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "rbackup")]
#[command(version, about = "Back up the saved tracks of a Spotify library", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print how many tracks are saved in the library
    Count {},
    /// Fetch every saved track and write it as a table
    Backup {
        /// File to write, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Tracks per request (1-50)
        #[arg(long, default_value_t = 50)]
        page_size: u32,
        /// Request one page at a time
        #[arg(long, conflicts_with = "workers")]
        sequential: bool,
        /// Pages in flight at once, defaults to available parallelism
        #[arg(long)]
        workers: Option<NonZeroUsize>,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Jsonl,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Count {} => {
            let spotify = authorized_client().await?;
            let fetcher = LibraryFetcher::new(spotify, ConfigBuilder::new().build()?);
            println!("{}", fetcher.total_count().await?);
        }
        Commands::Backup {
            output,
            format,
            page_size,
            sequential,
            workers,
            quiet,
        } => {
            let mode = match (sequential, workers) {
                (true, _) => FetchMode::Sequential,
                (false, Some(workers)) => FetchMode::Concurrent { workers },
                (false, None) => FetchMode::concurrent_default(),
            };
            let config = ConfigBuilder::new()
                .page_size(page_size)
                .mode(mode)
                .show_progress(!quiet)
                .build()?;
            backup_tracks(config, output, format).await?;
        }
    }
    Ok(())
}

async fn authorized_client() -> Result<SpotifyClient> {
    info!("Authorizing client ...");
    let spotify = SpotifyClient::try_default()?;
    // CLI prompt may be shown here
    spotify.authorize_client().await?;
    Ok(spotify)
}

async fn backup_tracks(
    config: rbackup::fetcher::Config,
    output: Option<PathBuf>,
    format: Format,
) -> Result<()> {
    let spotify = authorized_client().await?;
    let fetcher = LibraryFetcher::new(spotify, config);
    let table = fetcher.backup().await?;
    write_table(&table, output, format).await
}

async fn write_table(table: &LibraryTable, output: Option<PathBuf>, format: Format) -> Result<()> {
    let mut encoded = match format {
        Format::Json => table.to_json()?,
        Format::Jsonl => table.to_json_lines()?,
    };
    match output {
        Some(path) => {
            info!("Writing {} tracks to {path:?}", table.len());
            tokio::fs::write(&path, encoded).await?;
        }
        None => {
            if !encoded.ends_with('\n') {
                encoded.push('\n');
            }
            let mut stdout = tokio::io::stdout();
            stdout.write_all(encoded.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
