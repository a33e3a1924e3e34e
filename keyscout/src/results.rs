use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::{Path, PathBuf};

use crate::errors::SearchResult;
use crate::keywords::KeywordSet;
use crate::metrics::ScanStats;

/// "This file contains this keyword", with the keyword in normalized form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    pub keyword: String,
    pub path: PathBuf,
}

impl MatchEvent {
    pub fn new(keyword: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            keyword: keyword.into(),
            path: path.into(),
        }
    }
}

/// Keyword -> files mapping returned by a search.
///
/// Keys keep the caller's casing and order. Every keyword is present, and
/// each file list is deduplicated and sorted by path bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    entries: Vec<(String, Vec<PathBuf>)>,
}

impl ResultMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// Files containing `keyword`, looked up by original casing
    pub fn get(&self, keyword: &str) -> Option<&[PathBuf]> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, files)| files.as_slice())
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(k, files)| (k.as_str(), files.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct files with at least one match
    pub fn files_with_matches(&self) -> usize {
        let mut files: Vec<&Path> = self
            .entries
            .iter()
            .flat_map(|(_, files)| files.iter().map(PathBuf::as_path))
            .collect();
        files.sort_unstable();
        files.dedup();
        files.len()
    }

    /// Renders the mapping as pretty-printed JSON
    pub fn to_json(&self) -> SearchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (keyword, files) in &self.entries {
            let files: Vec<String> = files
                .iter()
                .map(|f| f.to_string_lossy().into_owned())
                .collect();
            map.serialize_entry(keyword, &files)?;
        }
        map.end()
    }
}

/// Collects match events into a [`ResultMap`].
///
/// All mutation happens on the calling thread; workers only produce events.
#[derive(Debug)]
pub struct Aggregator<'a> {
    keywords: &'a KeywordSet,
    files: Vec<Vec<PathBuf>>,
}

impl<'a> Aggregator<'a> {
    /// Starts with an empty list for every original keyword
    pub fn new(keywords: &'a KeywordSet) -> Self {
        Self {
            keywords,
            files: vec![Vec::new(); keywords.len()],
        }
    }

    /// Attributes a file to every original keyword with this normalized form
    pub fn record(&mut self, keyword: &str, path: &Path) {
        for &slot in self.keywords.slots(keyword) {
            self.files[slot].push(path.to_path_buf());
        }
    }

    pub fn record_event(&mut self, event: MatchEvent) {
        self.record(&event.keyword, &event.path);
    }

    /// Deduplicates and sorts every list
    pub fn finish(self) -> ResultMap {
        let entries = self
            .keywords
            .originals()
            .iter()
            .cloned()
            .zip(self.files)
            .map(|(keyword, mut files)| {
                files.sort_unstable_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
                files.dedup();
                (keyword, files)
            })
            .collect();
        ResultMap { entries }
    }
}

impl Extend<MatchEvent> for Aggregator<'_> {
    fn extend<T: IntoIterator<Item = MatchEvent>>(&mut self, iter: T) {
        for event in iter {
            self.record_event(event);
        }
    }
}

/// Builds a finalized map from a stream of match events
pub fn aggregate<I>(keywords: &KeywordSet, events: I) -> ResultMap
where
    I: IntoIterator<Item = MatchEvent>,
{
    let mut aggregator = Aggregator::new(keywords);
    aggregator.extend(events);
    aggregator.finish()
}

/// Results of a search together with its scan statistics
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub results: ResultMap,
    pub stats: ScanStats,
}
