use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::cancel::CancelToken;
use super::isolated::run_isolated;
use super::scanner::LineScanner;
use super::shared::run_shared;
use crate::config::{SearchConfig, Strategy};
use crate::discovery::discover;
use crate::errors::SearchResult;
use crate::keywords::KeywordSet;
use crate::metrics::ScanStats;
use crate::results::{Aggregator, ResultMap, SearchReport};

/// Searches `root` for `keywords` with default settings otherwise
pub fn search_path<S: AsRef<str>>(
    root: &Path,
    keywords: &[S],
    worker_count: NonZeroUsize,
    strategy: Strategy,
) -> SearchResult<ResultMap> {
    let config = SearchConfig {
        keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
        root_path: root.to_path_buf(),
        worker_count,
        strategy,
        ..Default::default()
    };
    search(&config)
}

/// Performs a concurrent keyword search and returns the keyword mapping
pub fn search(config: &SearchConfig) -> SearchResult<ResultMap> {
    search_with_stats(config).map(|report| report.results)
}

/// Performs a concurrent keyword search, honoring the configured timeout
pub fn search_with_stats(config: &SearchConfig) -> SearchResult<SearchReport> {
    let token = CancelToken::from_timeout(config.timeout()?);
    search_with_token(config, &token)
}

/// Performs a concurrent keyword search that stops when `token` fires
pub fn search_with_token(config: &SearchConfig, token: &CancelToken) -> SearchResult<SearchReport> {
    info!(
        "Starting {} search for keywords: {:?}",
        config.strategy, config.keywords
    );
    let started = Instant::now();

    let keywords = KeywordSet::new(config.keywords.iter().cloned());
    if keywords.is_empty() {
        debug!("No keywords provided, returning empty result");
        return Ok(SearchReport::default());
    }

    let files = discover(&config.root_path, &config.extensions)?;
    let scanner = LineScanner::new(keywords.normalized(), config.decode_mode);
    let mut aggregator = Aggregator::new(&keywords);

    let stats = match config.strategy {
        Strategy::Shared => {
            let scans = run_shared(&files, &scanner, config.worker_count, token)?;
            let mut stats = ScanStats::new();
            for (path, scan) in &scans {
                stats.record(scan);
                for keyword in &scan.found {
                    aggregator.record(keyword, path);
                }
            }
            stats
        }
        Strategy::Isolated => {
            let output = run_isolated(&files, &scanner, config.worker_count, token)?;
            aggregator.extend(output.matches);
            output.stats
        }
    };

    let results = aggregator.finish();
    stats.log_stats();

    info!(
        "Search complete in {:?}. {} of {} files matched",
        started.elapsed(),
        results.files_with_matches(),
        files.len()
    );

    Ok(SearchReport { results, stats })
}
