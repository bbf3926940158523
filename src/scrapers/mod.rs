pub mod casa_sapo;
pub mod http;
pub mod query;
pub mod traits;
pub mod types;

pub use casa_sapo::{EntryError, EntryFailure, PageParser, ParsedPage};
pub use http::HttpFetcher;
pub use query::build_query_url;
pub use traits::{FetchResponse, PageFetcher};
pub use types::SearchCriteria;
