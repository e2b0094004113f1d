/// Raw saved items and flat track records
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Spotify API client
pub mod spotify;

pub use entities::TrackRecord;
pub use spotify::{SavedTracksApi, SpotifyClient};
