use rspotify::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Network, auth and rate limit failures all surface here, verbatim
    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    #[error("Failed to extract `{field}` from saved item #{position}")]
    ExtractionError { position: usize, field: &'static str },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Output error: {0}")]
    OutputError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
