pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{Result, ScoutError};
pub use models::ListingRecord;
pub use store::ListingStore;
pub use sync::{SyncController, SyncResult, SyncStatus};
