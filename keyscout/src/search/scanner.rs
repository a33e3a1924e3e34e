use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::DecodeMode;
use crate::keywords::normalize;

const BUFFER_CAPACITY: usize = 65536;
const LINE_CAPACITY: usize = 256;

/// How a file scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOutcome {
    /// Every line was read
    #[default]
    Completed,
    /// All keywords matched before the end of the file
    EarlyExit,
    /// The file could not be opened or read
    Unreadable,
}

/// Result of scanning one file
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    /// Normalized keywords found in the file
    pub found: HashSet<String>,
    /// Number of lines read before the scan stopped
    pub lines_read: u64,
    /// Whether any invalid UTF-8 had to be dropped or replaced
    pub lossy: bool,
    pub outcome: ScanOutcome,
}

impl FileScan {
    fn unreadable() -> Self {
        Self {
            outcome: ScanOutcome::Unreadable,
            ..Default::default()
        }
    }
}

/// Decodes one raw line according to the decode mode
fn decode_line(bytes: &[u8], decode_mode: DecodeMode) -> (Cow<'_, str>, bool) {
    match std::str::from_utf8(bytes) {
        Ok(valid) => (Cow::Borrowed(valid), false),
        Err(_) => match decode_mode {
            DecodeMode::Replace => (String::from_utf8_lossy(bytes), true),
            DecodeMode::Ignore => {
                let mut decoded = String::with_capacity(bytes.len());
                for chunk in bytes.utf8_chunks() {
                    decoded.push_str(chunk.valid());
                }
                (Cow::Owned(decoded), true)
            }
        },
    }
}

/// Scans files line by line for a fixed set of lowercase keywords.
///
/// Cloning is cheap; the keyword list is shared immutably between clones so
/// each worker can own a scanner.
#[derive(Debug, Clone)]
pub struct LineScanner {
    keywords: Arc<[String]>,
    decode_mode: DecodeMode,
}

impl LineScanner {
    /// Creates a scanner for already-normalized, distinct keywords
    pub fn new(keywords: Arc<[String]>, decode_mode: DecodeMode) -> Self {
        Self {
            keywords,
            decode_mode,
        }
    }

    /// Scans a file and returns the keywords it contains.
    ///
    /// Never fails: a file that cannot be opened or read yields an empty set
    /// with [`ScanOutcome::Unreadable`].
    pub fn scan(&self, path: &Path) -> FileScan {
        trace!("Scanning file: {}", path.display());

        if self.keywords.is_empty() {
            return FileScan::default();
        }

        match self.scan_lines(path) {
            Ok(scan) => {
                if scan.lossy {
                    warn!("Invalid UTF-8 skipped in file: {}", path.display());
                }
                scan
            }
            Err(e) => {
                debug!("Failed to read {}: {}", path.display(), e);
                FileScan::unreadable()
            }
        }
    }

    fn scan_lines(&self, path: &Path) -> std::io::Result<FileScan> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut buffer = Vec::with_capacity(LINE_CAPACITY);
        let mut scan = FileScan::default();

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            scan.lines_read += 1;

            let (line, lossy) = decode_line(&buffer, self.decode_mode);
            scan.lossy |= lossy;
            let line = normalize(&line);

            for keyword in self.keywords.iter() {
                if !scan.found.contains(keyword) && line.contains(keyword.as_str()) {
                    scan.found.insert(keyword.clone());
                }
            }

            if scan.found.len() == self.keywords.len() {
                scan.outcome = ScanOutcome::EarlyExit;
                break;
            }
        }

        Ok(scan)
    }
}
