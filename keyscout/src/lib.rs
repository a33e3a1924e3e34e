pub mod config;
pub mod discovery;
pub mod errors;
pub mod filters;
pub mod keywords;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{CliOverrides, DecodeMode, SearchConfig, Strategy};
pub use errors::{ScanError, SearchResult};
pub use keywords::KeywordSet;
pub use metrics::ScanStats;
pub use results::{MatchEvent, ResultMap, SearchReport};
pub use search::{search, search_path, search_with_stats, search_with_token, CancelToken};
