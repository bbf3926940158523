use async_trait::async_trait;
use house_scout::scrapers::{FetchResponse, PageFetcher, SearchCriteria};
use house_scout::{Config, ListingStore, ScoutError, SyncController, SyncStatus};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/search_results.html");

/// Serves a canned response and remembers which urls were asked for.
struct CannedFetcher {
    response: FetchResponse,
    requested: Mutex<Vec<String>>,
}

impl CannedFetcher {
    fn page(body: &str) -> Self {
        Self {
            response: FetchResponse::Page(body.as_bytes().to_vec()),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            response: FetchResponse::Failed { status },
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> house_scout::Result<FetchResponse> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(self.response.clone())
    }

    fn source_name(&self) -> &'static str {
        "canned"
    }
}

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        criteria: SearchCriteria::default(),
        data_dir: temp_dir.path().join("house_data"),
        request_timeout: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn test_first_cycle_stores_new_listings() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let mut controller = SyncController::new(&config, CannedFetcher::page(FIXTURE)).unwrap();

    let result = controller.run_cycle(&config.criteria).await.unwrap();

    assert_eq!(result.status, SyncStatus::Success);
    assert_eq!(result.new_entries_count, 3);
    assert_eq!(result.discovered.len(), 3);
    assert_eq!(result.parse_errors.len(), 1);
    assert_eq!(result.parse_errors[0].index, 2);
    assert_eq!(
        result.last_entry_date.unwrap().to_string(),
        "2016-10-10"
    );

    let mut reloaded = ListingStore::new(&config.data_dir);
    reloaded.load().unwrap();
    assert_eq!(reloaded.entries(), controller.store().entries());
}

#[tokio::test]
async fn test_repeated_cycle_finds_nothing_new() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    let mut first = SyncController::new(&config, CannedFetcher::page(FIXTURE)).unwrap();
    first.run_cycle(&config.criteria).await.unwrap();

    let mut second = SyncController::new(&config, CannedFetcher::page(FIXTURE)).unwrap();
    assert_eq!(second.store().len(), 3);
    let result = second.run_cycle(&config.criteria).await.unwrap();

    assert_eq!(result.status, SyncStatus::Success);
    assert_eq!(result.new_entries_count, 0);
    assert!(result.discovered.is_empty());
    assert_eq!(second.store().len(), 3);
}

#[tokio::test]
async fn test_cycle_always_queries_first_page() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let fetcher = CannedFetcher::page(FIXTURE);
    let mut controller = SyncController::new(&config, fetcher).unwrap();

    controller
        .run_cycle(&config.criteria.with_page(4))
        .await
        .unwrap();

    let requested = controller_requests(&controller);
    assert_eq!(requested.len(), 1);
    assert!(requested[0].ends_with("pn=1"));
}

#[tokio::test]
async fn test_process_page_uses_requested_page() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let mut controller = SyncController::new(&config, CannedFetcher::page(FIXTURE)).unwrap();

    controller
        .process_page(&config.criteria.with_page(3))
        .await
        .unwrap();

    assert!(controller_requests(&controller)[0].ends_with("pn=3"));
}

#[tokio::test]
async fn test_cycle_folds_extra_store_files_into_canonical() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    std::fs::create_dir_all(&config.data_dir).unwrap();
    let backup = r#"{"entries":[{"date":"2016-09-30","loc":"Lisboa","p":500000,"t":"Apartamento",
        "T":"T3","st":"Novo","UA":130,"GA":150,"url":"https://casa.sapo.pt/old-listing.html"}]}"#;
    std::fs::write(config.data_dir.join("backup.json"), backup).unwrap();

    let mut controller = SyncController::new(&config, CannedFetcher::page(FIXTURE)).unwrap();
    let result = controller.run_cycle(&config.criteria).await.unwrap();

    assert_eq!(result.new_entries_count, 3);
    assert_eq!(controller.store().len(), 4);
    let files: Vec<_> = std::fs::read_dir(&config.data_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec![std::ffi::OsString::from("listings.json")]);

    let mut reloaded = ListingStore::new(&config.data_dir);
    reloaded.load().unwrap();
    assert!(reloaded.contains("https://casa.sapo.pt/old-listing.html"));
    assert_eq!(reloaded.len(), 4);
}

#[tokio::test]
async fn test_fetch_failure_leaves_store_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    let mut seeded = SyncController::new(&config, CannedFetcher::page(FIXTURE)).unwrap();
    seeded.run_cycle(&config.criteria).await.unwrap();
    let canonical = config.data_dir.join("listings.json");
    let before = std::fs::read_to_string(&canonical).unwrap();

    let mut controller = SyncController::new(&config, CannedFetcher::failing(503)).unwrap();
    let result = controller.run_cycle(&config.criteria).await.unwrap();

    assert_eq!(result.status, SyncStatus::FetchFailed { status: 503 });
    assert_eq!(result.new_entries_count, 0);
    assert!(result.last_entry_date.is_none());
    assert_eq!(std::fs::read_to_string(&canonical).unwrap(), before);
}

#[tokio::test]
async fn test_empty_first_run_reports_empty_store() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let empty_page = "<html><body><div class=\"searchResults\"></div></body></html>";
    let mut controller = SyncController::new(&config, CannedFetcher::page(empty_page)).unwrap();

    let err = controller.run_cycle(&config.criteria).await.unwrap_err();

    assert!(matches!(err, ScoutError::EmptyStore));
    assert!(!config.data_dir.join("listings.json").exists());
}

#[tokio::test]
async fn test_invalid_criteria_fails_before_fetch() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let mut controller = SyncController::new(&config, CannedFetcher::page(FIXTURE)).unwrap();
    let criteria = SearchCriteria {
        min_rooms: 6,
        max_rooms: 2,
        ..SearchCriteria::default()
    };

    let err = controller.run_cycle(&criteria).await.unwrap_err();

    assert!(matches!(err, ScoutError::InvalidCriteria { .. }));
    assert!(controller_requests(&controller).is_empty());
}

fn controller_requests(controller: &SyncController<CannedFetcher>) -> Vec<String> {
    controller.fetcher().requested.lock().unwrap().clone()
}
