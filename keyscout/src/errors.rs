/// Error types for keyword searches.
///
/// Only failures that abort a whole invocation surface here: a bad root path,
/// a worker pool that cannot be built, a crashed isolated worker, or a fired
/// cancellation token. Problems with individual files never become errors;
/// the affected file simply contributes no matches.
///
/// ```rust,ignore
/// match keyscout::search(&config) {
///     Ok(results) => render(results),
///     Err(ScanError::RootNotFound(path)) => eprintln!("no such path: {}", path.display()),
///     Err(e) => eprintln!("search failed: {}", e),
/// }
/// ```
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, ScanError>;

/// Errors that can abort a search
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Root path not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Failed to set up worker pool: {0}")]
    PoolSetup(String),
    #[error("Worker {worker} terminated without finishing its files")]
    WorkerCrashed { worker: usize },
    #[error("Search timed out after {0:?}")]
    Timeout(Duration),
    #[error("Search was cancelled")]
    Cancelled,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid duration '{value}': {source}")]
    InvalidDuration {
        value: String,
        source: humantime::DurationError,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Makes the path absolute without resolving symlinks and strips UNC prefixes
/// so that comparisons on Windows are consistent.
///
/// `.` and `..` components are folded lexically, so a root reached through a
/// symlink keeps the symlinked prefix in every reported path. The path must
/// exist.
pub fn unify_path(original: &Path) -> SearchResult<PathBuf> {
    let absolute = if original.is_absolute() {
        original.to_path_buf()
    } else {
        std::env::current_dir()?.join(original)
    };
    let absolute = normalize_lexically(&absolute);
    std::fs::metadata(&absolute).map_err(|e| root_error(original, e))?;
    Ok(strip_unc_prefix(&absolute))
}

/// Maps an I/O failure on the search root to the matching error
pub fn root_error(root: &Path, e: std::io::Error) -> ScanError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::root_not_found(root),
        std::io::ErrorKind::PermissionDenied => ScanError::permission_denied(root),
        _ => ScanError::IoError(e),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Strips the Windows UNC prefix (\\?\) from a path if present
fn strip_unc_prefix(p: &Path) -> PathBuf {
    let s = p.display().to_string();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        p.to_path_buf()
    }
}

impl ScanError {
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn pool_setup(msg: impl Into<String>) -> Self {
        Self::PoolSetup(msg.into())
    }

    pub fn worker_crashed(worker: usize) -> Self {
        Self::WorkerCrashed { worker }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_duration(value: impl Into<String>, source: humantime::DurationError) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_error_creation() {
        let path = Path::new("notes.txt");
        let err = ScanError::root_not_found(path);
        assert!(matches!(err, ScanError::RootNotFound(_)));

        let err = ScanError::permission_denied(path);
        assert!(matches!(err, ScanError::PermissionDenied(_)));

        let err = ScanError::pool_setup("no threads");
        assert!(matches!(err, ScanError::PoolSetup(_)));

        let err = ScanError::worker_crashed(3);
        assert!(matches!(err, ScanError::WorkerCrashed { worker: 3 }));
    }

    #[test]
    fn test_error_messages() {
        let err = ScanError::root_not_found("missing/dir");
        assert_eq!(err.to_string(), "Root path not found: missing/dir");

        let err = ScanError::worker_crashed(2);
        assert_eq!(
            err.to_string(),
            "Worker 2 terminated without finishing its files"
        );

        let err = ScanError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Search timed out after 5s");

        let err = ScanError::config_error("keywords must not be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: keywords must not be empty"
        );
    }

    #[test]
    fn test_unify_path_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = unify_path(&missing).unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(p) if p == missing));
    }

    #[test]
    fn test_unify_path_is_absolute() {
        let dir = tempdir().unwrap();
        let unified = unify_path(dir.path()).unwrap();
        assert!(unified.is_absolute());
    }

    #[test]
    fn test_unify_path_folds_dot_components() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        let winding = dir.path().join("a").join(".").join("b").join("..");
        assert_eq!(unify_path(&winding).unwrap(), dir.path().join("a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unify_path_keeps_symlinked_root() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        std::fs::create_dir(&target).unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(unify_path(&link).unwrap(), link);
    }
}
