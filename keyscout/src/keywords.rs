/// Keyword normalization.
///
/// Keywords are matched in lowercase but reported under the casing the caller
/// supplied. When several keywords lowercase to the same text (`"Foo"` and
/// `"foo"`), each keeps its own output key and all of them receive the same
/// file list. Exact duplicates collapse into the first occurrence.
use std::collections::HashMap;
use std::sync::Arc;

/// The keywords of one search, in original and normalized form
#[derive(Debug, Clone)]
pub struct KeywordSet {
    originals: Vec<String>,
    normalized: Arc<[String]>,
    lookup: HashMap<String, Vec<usize>>,
}

impl KeywordSet {
    /// Builds the set from caller-supplied keywords, preserving their order
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut originals: Vec<String> = Vec::new();
        let mut normalized: Vec<String> = Vec::new();
        let mut lookup: HashMap<String, Vec<usize>> = HashMap::new();

        for keyword in keywords {
            let keyword = keyword.into();
            if originals.contains(&keyword) {
                continue;
            }
            let lowered = normalize(&keyword);
            let slots = lookup.entry(lowered.clone()).or_default();
            if slots.is_empty() {
                normalized.push(lowered);
            }
            slots.push(originals.len());
            originals.push(keyword);
        }

        Self {
            originals,
            normalized: normalized.into(),
            lookup,
        }
    }

    /// Original keywords in output order
    pub fn originals(&self) -> &[String] {
        &self.originals
    }

    /// Distinct lowercase forms handed to the scanner
    pub fn normalized(&self) -> Arc<[String]> {
        Arc::clone(&self.normalized)
    }

    /// Indices into `originals()` of every keyword with this normalized form
    pub fn slots(&self, normalized: &str) -> &[usize] {
        self.lookup.get(normalized).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }
}

/// Lowercases a keyword or line for matching
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}
