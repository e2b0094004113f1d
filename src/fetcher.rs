use std::num::NonZeroUsize;

use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use crate::clients::{
    entities::TrackRecord,
    errors::{Error, Result},
    spotify::{MAX_PAGE_SIZE, SavedTracksApi},
};
use crate::table::LibraryTable;

/// How pages are requested during a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// One request at a time, in offset order
    Sequential,
    /// Up to `workers` requests in flight at once
    Concurrent { workers: NonZeroUsize },
}

impl FetchMode {
    /// Concurrent mode sized to the host's available parallelism
    pub fn concurrent_default() -> Self {
        let workers = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        FetchMode::Concurrent { workers }
    }
}

// Configuration for the LibraryFetcher struct, only built through `ConfigBuilder`
#[derive(Debug, Clone)]
pub struct Config {
    page_size: u32,
    mode: FetchMode,
    show_progress: bool,
}

impl Config {
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }
}

pub struct ConfigBuilder {
    page_size: Option<u32>,
    mode: Option<FetchMode>,
    show_progress: Option<bool>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            page_size: None,
            mode: None,
            show_progress: None,
        }
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: FetchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = Some(show_progress);
        self
    }

    pub fn build(self) -> Result<Config> {
        let page_size = self.page_size.unwrap_or(MAX_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::ConfigurationError(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }
        Ok(Config {
            page_size,
            mode: self.mode.unwrap_or_else(FetchMode::concurrent_default),
            show_progress: self.show_progress.unwrap_or(true),
        })
    }
}

/// Offsets of every page needed to cover `total` items: `0, page_size, 2 * page_size, ...`
pub fn page_offsets(total: u32, page_size: u32) -> Result<Vec<u32>> {
    if page_size == 0 {
        return Err(Error::ConfigurationError("Page size must be at least 1".into()));
    }
    Ok((0..total).step_by(page_size as usize).collect())
}

/// Retrieves a whole saved-tracks library, one page per request.
pub struct LibraryFetcher<A> {
    api: A,
    config: Config,
}

impl<A: SavedTracksApi> LibraryFetcher<A> {
    pub fn new(api: A, config: Config) -> Self {
        LibraryFetcher { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Number of saved tracks in the library, as reported by the API.
    pub async fn total_count(&self) -> Result<u32> {
        let page = self.api.saved_tracks_page(1, 0).await?;
        Ok(page.total)
    }

    /// Fetch every saved track and flatten it into a table.
    ///
    /// Rows are ordered by page offset, then by position within the page, whatever
    /// the fetch mode. Any failure aborts the backup and discards what was fetched.
    pub async fn backup(&self) -> Result<LibraryTable> {
        info!("Starting library backup ...");
        let total = self.total_count().await?;
        let offsets = page_offsets(total, self.config.page_size)?;
        debug!(
            "Library holds {total} saved tracks, fetching {} pages of {}",
            offsets.len(),
            self.config.page_size
        );

        if offsets.is_empty() {
            info!("No saved tracks found. Backup completed.");
            return Ok(LibraryTable::default());
        }

        let progress = self.progress_bar(offsets.len());
        let pages = self.fetch_pages(offsets, &progress).await?;

        let table: LibraryTable = pages.into_iter().flatten().collect();
        info!("Backup completed. Saved tracks: {}", table.len());
        Ok(table)
    }

    // Fetch every page in offset order. The progress bar is cleared whether or
    // not a page fails.
    async fn fetch_pages(
        &self,
        offsets: Vec<u32>,
        progress: &ProgressBar,
    ) -> Result<Vec<Vec<TrackRecord>>> {
        let pages = match self.config.mode {
            FetchMode::Sequential => {
                stream::iter(offsets)
                    .then(|offset| self.fetch_page_with_progress(offset, progress))
                    .try_collect::<Vec<_>>()
                    .await
            }
            FetchMode::Concurrent { workers } => {
                // `buffered` yields in submission order, not completion order
                stream::iter(offsets)
                    .map(|offset| self.fetch_page_with_progress(offset, progress))
                    .buffered(workers.get())
                    .try_collect::<Vec<_>>()
                    .await
            }
        };
        progress.finish_and_clear();
        pages
    }

    async fn fetch_page_with_progress(
        &self,
        offset: u32,
        progress: &ProgressBar,
    ) -> Result<Vec<TrackRecord>> {
        let page = self.fetch_page(offset).await?;
        progress.inc(1);
        Ok(page)
    }

    // Fetch the page starting at `offset` and flatten its items.
    // An empty page yields no records.
    async fn fetch_page(&self, offset: u32) -> Result<Vec<TrackRecord>> {
        debug!("Requesting page at offset {offset}");
        let page = self
            .api
            .saved_tracks_page(self.config.page_size, offset)
            .await?;

        page.items
            .into_iter()
            .enumerate()
            .map(|(i, item)| TrackRecord::extract(item, offset as usize + i))
            .collect()
    }

    fn progress_bar(&self, pages: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(pages as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} pages {elapsed}") {
            bar.set_style(style);
        }
        bar
    }
}
