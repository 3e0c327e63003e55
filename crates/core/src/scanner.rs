//! Lists the top level of a target directory and reads file metadata.

use crate::config::{OrganizationSettings, ScanConfig};
use crate::error::{OrganizeError, ScanError};
use crate::models::{normalized_ext, FileRecord};
use chrono::{DateTime, Utc};
use globset::GlobSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Eligible files, ordered by file name.
    pub records: Vec<FileRecord>,
    pub errors: Vec<ScanError>,
}

/// Only direct children are visited. Subdirectories, including the ones
/// earlier runs created, are never entered, and symlinks are not followed.
pub fn scan(
    root: &Path,
    settings: &OrganizationSettings,
    scan_cfg: &ScanConfig,
) -> Result<ScanOutcome, OrganizeError> {
    let excludes = scan_cfg.exclude_set()?;
    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                warn!("unable to read directory entry {:?}: {}", path, e);
                outcome.errors.push(ScanError::metadata(path, e));
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if !scan_cfg.include_hidden && is_hidden(path) {
            continue;
        }
        if is_excluded(path, &excludes) {
            debug!("excluded by pattern: {:?}", path);
            continue;
        }
        if !settings.selects(&normalized_ext(path)) {
            continue;
        }

        match entry.metadata() {
            Ok(meta) => match meta.modified() {
                Ok(mtime) => {
                    let modified: DateTime<Utc> = mtime.into();
                    outcome
                        .records
                        .push(FileRecord::new(path.to_path_buf(), meta.len(), modified));
                }
                Err(e) => {
                    warn!("no modification time for {:?}: {}", path, e);
                    outcome.errors.push(ScanError::metadata(path, e));
                }
            },
            Err(e) => {
                warn!("unable to stat {:?}: {}", path, e);
                outcome.errors.push(ScanError::metadata(path, e));
            }
        }
    }

    debug!(
        "scanned {:?}: {} eligible, {} errors",
        root,
        outcome.records.len(),
        outcome.errors.len()
    );
    Ok(outcome)
}

/// Fails with a configuration error when `root` is missing, not a
/// directory, or cannot be listed.
pub fn ensure_directory(root: &Path) -> Result<PathBuf, OrganizeError> {
    if root.as_os_str().is_empty() {
        return Err(OrganizeError::config("no target directory given"));
    }
    let meta = std::fs::metadata(root)
        .map_err(|e| OrganizeError::config(format!("target directory {:?}: {}", root, e)))?;
    if !meta.is_dir() {
        return Err(OrganizeError::config(format!(
            "target {:?} is not a directory",
            root
        )));
    }
    std::fs::read_dir(root).map_err(|e| {
        OrganizeError::config(format!("target directory {:?} is not readable: {}", root, e))
    })?;
    Ok(root.to_path_buf())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    path.file_name()
        .map(|name| excludes.is_match(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn settings(exts: &[&str]) -> OrganizationSettings {
        OrganizationSettings {
            extensions: exts.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn lists_only_top_level_selected_files_in_name_order() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("song.mp3"), "x").unwrap();
        fs::write(root.join(".hidden.txt"), "h").unwrap();
        fs::create_dir_all(root.join("txt")).unwrap();
        fs::write(root.join("txt").join("nested.txt"), "n").unwrap();

        let out = scan(root, &settings(&[".txt"]), &ScanConfig::default()).unwrap();
        let names: Vec<String> = out.records.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(out.errors.is_empty());
        assert_eq!(out.records[0].size, 1);
    }

    #[test]
    fn other_bucket_picks_up_unknown_extensions() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("notes.xyz"), "x").unwrap();
        fs::write(root.join("Makefile"), "all:").unwrap();
        fs::write(root.join("script.py"), "print()").unwrap();

        let out = scan(root, &settings(&["other"]), &ScanConfig::default()).unwrap();
        let names: Vec<String> = out.records.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["Makefile", "notes.xyz"]);
    }

    #[test]
    fn exclude_patterns_and_hidden_toggle() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("keep.txt"), "k").unwrap();
        fs::write(root.join("draft-1.txt"), "d").unwrap();
        fs::write(root.join(".dot.txt"), "d").unwrap();

        let cfg = ScanConfig {
            include_hidden: true,
            exclude: vec!["draft-*".into()],
            ..Default::default()
        };
        let out = scan(root, &settings(&[".txt"]), &cfg).unwrap();
        let names: Vec<String> = out.records.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec![".dot.txt", "keep.txt"]);
    }

    #[test]
    fn missing_directory_is_configuration_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = ensure_directory(&temp.path().join("nope")).unwrap_err();
        assert!(err.is_configuration());

        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(ensure_directory(&file).unwrap_err().is_configuration());
        assert!(ensure_directory(temp.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_configuration_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits, nothing to check then.
        let listable = fs::read_dir(&locked).is_ok();
        let result = ensure_directory(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if listable {
            return;
        }
        assert!(result.unwrap_err().is_configuration());
    }
}
