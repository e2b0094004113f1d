use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::errors::{Error, Result};

#[derive(Debug, Clone)]
pub struct RawAlbum {
    pub name: String,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawTrack {
    pub name: String,
    pub artists: Vec<String>, // artist names, in the order the API lists them
    pub album: RawAlbum,
    pub disc_number: i32,
    pub track_number: u32,
    pub uri: Option<String>, // local files have no Spotify URI
}

/// One item of the saved tracks endpoint, decoupled from the client library models.
#[derive(Debug, Clone)]
pub struct SavedItem {
    pub added_at: DateTime<Utc>,
    pub track: RawTrack,
}

/// One page of saved items as returned by a single request.
#[derive(Debug, Clone, Default)]
pub struct SavedTracksPage {
    /// Total number of saved tracks in the library, not in this page
    pub total: u32,
    pub items: Vec<SavedItem>,
}

/// Flat row of a library backup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRecord {
    pub song_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub album_release_date: String,
    pub disc_number: i32,
    pub track_number: u32,
    pub added_at: String,
    pub spotify_uri: String,
}

impl TrackRecord {
    /// Column names, in field order
    pub const COLUMNS: [&'static str; 8] = [
        "song_name",
        "artist_name",
        "album_name",
        "album_release_date",
        "disc_number",
        "track_number",
        "added_at",
        "spotify_uri",
    ];

    /// Flatten a saved item into a record.
    ///
    /// `position` is the index of the item within the whole library and is only
    /// used to point at the offending item when a nested field is missing.
    pub fn extract(item: SavedItem, position: usize) -> Result<Self> {
        let missing = |field| Error::ExtractionError { position, field };

        let SavedItem { added_at, track } = item;
        let artist_name = track
            .artists
            .into_iter()
            .next()
            .ok_or_else(|| missing("track.artists[0].name"))?;
        let album_release_date = track
            .album
            .release_date
            .ok_or_else(|| missing("track.album.release_date"))?;
        let spotify_uri = track.uri.ok_or_else(|| missing("track.uri"))?;

        Ok(TrackRecord {
            song_name: track.name,
            artist_name,
            album_name: track.album.name,
            album_release_date,
            disc_number: track.disc_number,
            track_number: track.track_number,
            added_at: added_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            spotify_uri,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    pub(crate) fn saved_item(n: usize) -> SavedItem {
        SavedItem {
            added_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            track: RawTrack {
                name: format!("Song {n}"),
                artists: vec![format!("Artist {n}"), "Featured".into()],
                album: RawAlbum {
                    name: format!("Album {n}"),
                    release_date: Some("1999-05-17".into()),
                },
                disc_number: 1,
                track_number: u32::try_from(n % 12 + 1).unwrap(),
                uri: Some(format!("spotify:track:{n:022}")),
            },
        }
    }

    #[test]
    fn test_extract_copies_nested_fields() {
        let record = TrackRecord::extract(saved_item(7), 7).unwrap();

        assert_eq!(record.song_name, "Song 7");
        assert_eq!(record.artist_name, "Artist 7");
        assert_eq!(record.album_name, "Album 7");
        assert_eq!(record.album_release_date, "1999-05-17");
        assert_eq!(record.disc_number, 1);
        assert_eq!(record.track_number, 8);
        assert_eq!(record.added_at, "2024-03-01T12:00:00Z");
        assert_eq!(record.spotify_uri, "spotify:track:0000000000000000000007");
    }

    #[test]
    fn test_extract_keeps_partial_release_dates() {
        let mut item = saved_item(0);
        item.track.album.release_date = Some("1971".into());

        let record = TrackRecord::extract(item, 0).unwrap();
        assert_eq!(record.album_release_date, "1971");
    }

    #[test]
    fn test_extract_fails_without_artists() {
        let mut item = saved_item(3);
        item.track.artists.clear();

        let err = TrackRecord::extract(item, 53).unwrap_err();
        assert!(matches!(
            err,
            Error::ExtractionError {
                position: 53,
                field: "track.artists[0].name"
            }
        ));
    }

    #[test]
    fn test_extract_fails_for_local_tracks() {
        let mut item = saved_item(1);
        item.track.uri = None;

        let err = TrackRecord::extract(item, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::ExtractionError {
                field: "track.uri",
                ..
            }
        ));
    }

    #[test]
    fn test_extract_fails_without_release_date() {
        let mut item = saved_item(2);
        item.track.album.release_date = None;

        let err = TrackRecord::extract(item, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::ExtractionError {
                field: "track.album.release_date",
                ..
            }
        ));
    }

    #[test]
    fn test_extract_keeps_fractional_seconds() {
        let mut item = saved_item(4);
        item.added_at += TimeDelta::milliseconds(123);

        let record = TrackRecord::extract(item, 4).unwrap();
        assert_eq!(record.added_at, "2024-03-01T12:00:00.123Z");
    }
}
