use std::path::PathBuf;

use async_trait::async_trait;
use log::debug;

use crate::clients::{
    entities::{RawAlbum, RawTrack, SavedItem, SavedTracksPage},
    errors::{Error, Result},
};
use rspotify::{
    AuthCodeSpotify, Config, Credentials, OAuth,
    model::{Page, SavedTrack},
    prelude::*,
    scopes,
};

/// Largest page the saved tracks endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 50;

/// The paginated "saved tracks" endpoint the fetcher depends on.
///
/// Implemented by [`SpotifyClient`] in production and by fakes in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavedTracksApi: Send + Sync {
    async fn saved_tracks_page(&self, limit: u32, offset: u32) -> Result<SavedTracksPage>;
}

impl From<SavedTrack> for SavedItem {
    fn from(f: SavedTrack) -> SavedItem {
        let track = f.track;
        SavedItem {
            added_at: f.added_at,
            track: RawTrack {
                name: track.name,
                artists: track.artists.into_iter().map(|a| a.name).collect(),
                album: RawAlbum {
                    name: track.album.name,
                    release_date: track.album.release_date,
                },
                disc_number: track.disc_number,
                track_number: track.track_number,
                uri: track.id.map(|id| id.uri()),
            },
        }
    }
}

impl From<Page<SavedTrack>> for SavedTracksPage {
    fn from(page: Page<SavedTrack>) -> SavedTracksPage {
        SavedTracksPage {
            total: page.total,
            items: page.items.into_iter().map(SavedItem::from).collect(),
        }
    }
}

pub struct SpotifyClient {
    pub spotify: AuthCodeSpotify,
}

impl SpotifyClient {
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        SpotifyClient { spotify }
    }

    /// Build a client from explicit credentials, caching the OAuth token at `cache_path`.
    pub fn with_credentials(creds: Credentials, oauth: OAuth, cache_path: PathBuf) -> Self {
        let spotify = AuthCodeSpotify::with_config(
            creds,
            oauth,
            Config {
                token_cached: true,
                cache_path,
                ..Default::default()
            },
        );
        Self { spotify }
    }

    // Authorize the Spotify client via CLI prompt and OAuth flow
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self.spotify.get_authorize_url(false)?;
        // Reuses the cached token when there is a valid one
        self.spotify.prompt_for_token(&url).await?;
        let user = self.spotify.me().await?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(())
    }

    // Create a SpotifyClient from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let creds = Credentials::from_env()
        .ok_or_else(|| Error::ConfigurationError("Missing Spotify credentials in environment variables. Set RSPOTIFY_CLIENT_ID and RSPOTIFY_CLIENT_SECRET.".into()))?;
        let oauth = OAuth::from_env(scopes!("user-library-read"))
        .ok_or_else(|| Error::ConfigurationError("Missing Spotify OAuth configuration in environment variables. Set RSPOTIFY_REDIRECT_URI.".into()))?;

        let cache_path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
            .join(".rbackup_token_cache");

        Ok(Self::with_credentials(creds, oauth, cache_path))
    }
}

#[async_trait]
impl SavedTracksApi for SpotifyClient {
    async fn saved_tracks_page(&self, limit: u32, offset: u32) -> Result<SavedTracksPage> {
        let page = self
            .spotify
            .current_user_saved_tracks_manual(None, Some(limit), Some(offset))
            .await?;
        debug!(
            "Fetched {} saved tracks at offset {offset} (total {})",
            page.items.len(),
            page.total
        );
        Ok(page.into())
    }
}
