use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{root_error, unify_path, SearchResult};
use crate::filters::should_include_file;

/// Resolves `root` and collects every text file beneath it.
///
/// A root that names a regular file is returned as the only target, whatever
/// its extension. Otherwise the tree is walked without any of the usual
/// hidden-file or `.gitignore` filtering and every regular file whose name
/// ends in one of `extensions` is returned as an absolute path. The order of
/// the returned paths is unspecified.
///
/// A missing root, or a root directory that cannot be listed, is an error.
/// Entries below the root that cannot be read during the walk are skipped.
pub fn discover(root: &Path, extensions: &[String]) -> SearchResult<Vec<PathBuf>> {
    let root = unify_path(root)?;

    if root.is_file() {
        debug!("Root {} is a single file", root.display());
        return Ok(vec![root]);
    }

    fs::read_dir(&root).map_err(|e| root_error(&root, e))?;

    let mut walker = WalkBuilder::new(&root);
    walker.standard_filters(false).follow_links(false);

    let files: Vec<PathBuf> = walker
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| match entry.file_type() {
            Some(ft) if ft.is_file() => true,
            Some(ft) if ft.is_symlink() => entry.path().is_file(),
            _ => false,
        })
        .filter(|entry| should_include_file(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect();

    debug!("Found {} files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScanError;
    use crate::filters::DEFAULT_EXTENSION;
    use std::fs;
    use tempfile::tempdir;

    fn txt() -> Vec<String> {
        vec![DEFAULT_EXTENSION.to_string()]
    }

    fn sorted(mut files: Vec<PathBuf>) -> Vec<PathBuf> {
        files.sort();
        files
    }

    #[test]
    fn test_discover_recursive() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("top.txt"), "top").unwrap();
        fs::write(nested.join("deep.TXT"), "deep").unwrap();
        fs::write(nested.join("skip.md"), "skip").unwrap();

        let files = sorted(discover(dir.path(), &txt()).unwrap());
        let root = unify_path(dir.path()).unwrap();
        assert_eq!(
            files,
            sorted(vec![
                root.join("top.txt"),
                root.join("a").join("b").join("deep.TXT")
            ])
        );
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn test_discover_includes_hidden_and_ignored() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden").join("secret.txt"), "x").unwrap();
        fs::write(dir.path().join(".gitignore"), "*.txt\n").unwrap();
        fs::write(dir.path().join("plain.txt"), "x").unwrap();

        let files = discover(dir.path(), &txt()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_discover_single_file_any_extension() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("data.csv");
        fs::write(&file, "a,b").unwrap();

        let files = discover(&file, &txt()).unwrap();
        assert_eq!(files, vec![unify_path(&file).unwrap()]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = tempdir().unwrap();
        let result = discover(&dir.path().join("nope"), &txt());
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_unreadable_root() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits are not enforced for root
        let enforced = fs::read_dir(&locked).is_err();
        let result = discover(&locked, &txt());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            assert!(matches!(result, Err(ScanError::PermissionDenied(_))));
        } else {
            assert_eq!(result.unwrap().len(), 1);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_unreadable_subdirectory_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "x").unwrap();
        fs::write(dir.path().join("open.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let enforced = fs::read_dir(&locked).is_err();
        let result = discover(dir.path(), &txt());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let files = result.unwrap();
        assert_eq!(files.len(), if enforced { 1 } else { 2 });
        assert!(files.contains(&dir.path().join("open.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_through_symlinked_root() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("note.txt"), "x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let files = discover(&link, &txt()).unwrap();
        assert_eq!(files, vec![link.join("note.txt")]);
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(discover(dir.path(), &txt()).unwrap().is_empty());
    }
}
