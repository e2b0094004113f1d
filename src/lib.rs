//! Rbackup - Back up the saved tracks of a Spotify library
//!
//! This library pages through the "saved tracks" endpoint, sequentially or with
//! several requests in flight, and flattens every item into a [`table::LibraryTable`].

/// Client modules for interacting with the Spotify Web API
pub mod clients;
/// Paginated library fetcher and its configuration
pub mod fetcher;
/// Flat table of track records
pub mod table;
