//! One sync cycle: query, fetch, parse, dedupe, persist.

use crate::config::Config;
use crate::error::Result;
use crate::models::ListingRecord;
use crate::scrapers::casa_sapo::{EntryError, PageParser};
use crate::scrapers::query::build_query_url;
use crate::scrapers::traits::{FetchResponse, PageFetcher};
use crate::scrapers::types::SearchCriteria;
use crate::store::ListingStore;
use chrono::NaiveDate;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Success,
    /// The site refused the query; the store was left untouched.
    FetchFailed { status: u16 },
}

/// Summary of one cycle.
#[derive(Debug)]
pub struct SyncResult {
    pub status: SyncStatus,
    pub new_entries_count: usize,
    /// Date of the last record in store order; `None` only when the fetch failed.
    pub last_entry_date: Option<NaiveDate>,
    pub discovered: Vec<ListingRecord>,
    pub parse_errors: Vec<EntryError>,
}

impl SyncResult {
    fn fetch_failed(status: u16) -> Self {
        Self {
            status: SyncStatus::FetchFailed { status },
            new_entries_count: 0,
            last_entry_date: None,
            discovered: Vec::new(),
            parse_errors: Vec::new(),
        }
    }
}

pub struct SyncController<F: PageFetcher> {
    fetcher: F,
    parser: PageParser,
    store: ListingStore,
}

impl<F: PageFetcher> SyncController<F> {
    /// Build a controller and load the store under `config.data_dir`.
    pub fn new(config: &Config, fetcher: F) -> Result<Self> {
        let mut store = ListingStore::new(&config.data_dir);
        store.load()?;

        Ok(Self {
            parser: PageParser::new()?,
            fetcher,
            store,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &ListingStore {
        &self.store
    }

    /// Process the first results page for `criteria`.
    pub async fn run_cycle(&mut self, criteria: &SearchCriteria) -> Result<SyncResult> {
        self.process_page(&criteria.with_page(1)).await
    }

    /// Process exactly the page named by `criteria.page_number`.
    pub async fn process_page(&mut self, criteria: &SearchCriteria) -> Result<SyncResult> {
        let query_url = build_query_url(criteria)?;
        info!("Querying {} page {}", self.fetcher.source_name(), criteria.page_number);

        let raw = match self.fetcher.fetch(&query_url).await? {
            FetchResponse::Page(raw) => raw,
            FetchResponse::Failed { status } => {
                warn!("Failed to query {}: status {}", self.fetcher.source_name(), status);
                return Ok(SyncResult::fetch_failed(status));
            }
        };

        let page = self.parser.parse_page(&raw);
        for error in &page.errors {
            warn!(index = error.index, "Failed to parse entry: {}", error.cause);
        }

        let mut discovered = Vec::new();
        for listing in page.listings {
            if self.store.contains(listing.key()) {
                continue;
            }
            info!(url = %listing.url, "🏠 New listing");
            self.store.append(listing.clone())?;
            discovered.push(listing);
        }

        let last_entry_date = self.store.last_entry_date()?;
        self.store.save()?;

        info!(
            "Found {} new listings, {} total",
            discovered.len(),
            self.store.len()
        );

        Ok(SyncResult {
            status: SyncStatus::Success,
            new_entries_count: discovered.len(),
            last_entry_date: Some(last_entry_date),
            discovered,
            parse_errors: page.errors,
        })
    }
}
