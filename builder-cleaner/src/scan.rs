//! Top-level directory enumeration of the git home.

use std::path::{Path, PathBuf};

use builder_core::DOT_GIT_SUFFIX;

use crate::error::{scan_err, CleanerError};

/// Every immediate subdirectory of `home` whose base name passes `filter`.
///
/// `filter` sees only the entry name, never the full path. Files, symlinks
/// and rejected names are skipped. Any I/O failure while reading
/// `home` fails the whole scan; callers never see a partial listing.
pub fn local_dirs<F>(home: &Path, filter: F) -> Result<Vec<PathBuf>, CleanerError>
where
    F: Fn(&str) -> bool,
{
    let entries = std::fs::read_dir(home).map_err(|e| scan_err(home, e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| scan_err(home, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 entry in git home");
            continue;
        };
        if name.is_empty() || name == "." {
            continue;
        }
        let ty = entry.file_type().map_err(|e| scan_err(entry.path(), e))?;
        if !ty.is_dir() {
            continue;
        }
        if filter(name) {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Scan filter accepting `<name>.git` directory names.
pub fn has_git_suffix(name: &str) -> bool {
    name.ends_with(DOT_GIT_SUFFIX)
}

/// Base names of `paths`, dropping any path without a UTF-8 file name.
pub fn base_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn only_matching_directories_are_returned() {
        let home = TempDir::new().expect("home");
        fs::create_dir(home.path().join("foo.git")).expect("mkdir");
        fs::create_dir(home.path().join("scratch")).expect("mkdir");
        fs::write(home.path().join("readme.txt"), "hi").expect("write");
        fs::write(home.path().join("file.git"), "not a dir").expect("write");

        let dirs = local_dirs(home.path(), has_git_suffix).expect("scan");
        assert_eq!(dirs, vec![home.path().join("foo.git")]);
    }

    #[test]
    fn missing_home_is_a_scan_error() {
        let home = TempDir::new().expect("home");
        let missing = home.path().join("nope");
        let err = local_dirs(&missing, has_git_suffix).unwrap_err();
        assert!(matches!(err, CleanerError::Scan { .. }), "got: {err}");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn filter_receives_base_name_only() {
        let home = TempDir::new().expect("home");
        fs::create_dir(home.path().join("app.git")).expect("mkdir");

        let dirs = local_dirs(home.path(), |name| {
            assert!(!name.contains('/'), "filter got a path: {name}");
            true
        })
        .expect("scan");
        assert_eq!(base_names(&dirs), vec!["app.git".to_string()]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_skipped_without_failing_the_scan() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let home = TempDir::new().expect("home");
        fs::create_dir(home.path().join(OsStr::from_bytes(b"bad\xff.git"))).expect("mkdir");
        fs::create_dir(home.path().join("ok.git")).expect("mkdir");

        let dirs = local_dirs(home.path(), has_git_suffix).expect("scan");
        assert_eq!(dirs, vec![home.path().join("ok.git")]);
    }

    #[test]
    fn git_suffix_filter() {
        assert!(has_git_suffix("foo.git"));
        assert!(!has_git_suffix("Foo.GIT"));
        assert!(!has_git_suffix("foo.git.bak"));
        assert!(!has_git_suffix("readme.txt"));
    }
}
