/// File filtering for discovery.
///
/// Matching is done on the file name rather than `Path::extension`, so a file
/// literally named `.txt` counts as a text file and `notes.TXT` matches the
/// `txt` extension.
use std::path::Path;

/// Default extension for text targets
pub const DEFAULT_EXTENSION: &str = "txt";

/// Checks if a file name ends with one of the given extensions, ignoring case
pub fn has_valid_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();

    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_lowercase();
        !ext.is_empty() && name.ends_with(&format!(".{}", ext))
    })
}

/// Determines if a walked entry should be scanned
pub fn should_include_file(path: &Path, extensions: &[String]) -> bool {
    has_valid_extension(path, extensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txt() -> Vec<String> {
        vec![DEFAULT_EXTENSION.to_string()]
    }

    #[test]
    fn test_has_valid_extension() {
        assert!(has_valid_extension(Path::new("notes.txt"), &txt()));
        assert!(has_valid_extension(Path::new("dir/NOTES.TXT"), &txt()));
        assert!(has_valid_extension(Path::new("archive.tar.Txt"), &txt()));
        assert!(has_valid_extension(Path::new(".txt"), &txt()));

        assert!(!has_valid_extension(Path::new("notes.md"), &txt()));
        assert!(!has_valid_extension(Path::new("notestxt"), &txt()));
        assert!(!has_valid_extension(Path::new("txt"), &txt()));
        assert!(!has_valid_extension(Path::new("notes.txt.bak"), &txt()));
        assert!(!has_valid_extension(Path::new("éétxt"), &txt()));
    }

    #[test]
    fn test_multiple_extensions() {
        let extensions = vec!["txt".to_string(), ".log".to_string()];
        assert!(has_valid_extension(Path::new("server.LOG"), &extensions));
        assert!(has_valid_extension(Path::new("readme.txt"), &extensions));
        assert!(!has_valid_extension(Path::new("main.rs"), &extensions));
    }

    #[test]
    fn test_empty_extension_list() {
        assert!(!should_include_file(Path::new("notes.txt"), &[]));
        assert!(!should_include_file(Path::new("notes.txt"), &[String::new()]));
    }
}
