//! Builds the move plan for one directory: scan, score keywords over the
//! whole batch, classify each file.

use crate::classifier::classify;
use crate::config::{OrganizationSettings, ScanConfig};
use crate::error::{OrganizeError, ScanError};
use crate::extractor;
use crate::keywords::KeywordExtractor;
use crate::models::{FileRecord, MovePlanEntry};
use crate::scanner;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Plan {
    pub root: PathBuf,
    /// One entry per eligible file, ordered by file name.
    pub entries: Vec<MovePlanEntry>,
    pub scan_errors: Vec<ScanError>,
    /// Recognized extensions left untouched although `other` is selected.
    pub shadowed_by_other: Vec<String>,
}

/// Settings and directory are checked before anything is read; a
/// configuration error means no file was touched.
pub fn plan(
    directory: &Path,
    settings: &OrganizationSettings,
    scan_cfg: &ScanConfig,
) -> Result<Plan, OrganizeError> {
    let validated = settings.validate()?;
    scan_cfg.exclude_set()?;
    let root = scanner::ensure_directory(directory)?;

    let scanned = scanner::scan(&root, settings, scan_cfg)?;
    let mut records = scanned.records;
    let mut scan_errors = scanned.errors;

    if settings.wants_text() {
        scan_errors.extend(extractor::load_texts(&mut records, scan_cfg.max_text_bytes));
        KeywordExtractor::new(settings.top_n, settings.min_score).apply(&mut records);
    }

    let mut entries: Vec<MovePlanEntry> = records
        .into_iter()
        .filter_map(|mut record| {
            let segments = classify(&record, settings);
            if segments.is_empty() {
                debug!("no segments for {:?}, leaving in place", record.path);
                return None;
            }
            // The text was only needed for scoring.
            record.text = None;
            Some(MovePlanEntry { record, segments })
        })
        .collect();
    entries.sort_by(|a, b| a.record.path.file_name().cmp(&b.record.path.file_name()));

    info!(
        "planned {} file(s) in {:?} ({} scan issue(s))",
        entries.len(),
        root,
        scan_errors.len()
    );
    Ok(Plan {
        root,
        entries,
        scan_errors,
        shadowed_by_other: validated.shadowed_by_other,
    })
}

/// Batch keywords for every eligible text file, without classifying or
/// moving anything. Strategy flags are ignored.
pub fn keywords(
    directory: &Path,
    settings: &OrganizationSettings,
    scan_cfg: &ScanConfig,
) -> Result<(Vec<FileRecord>, Vec<ScanError>), OrganizeError> {
    let mut preview = settings.clone();
    preview.extract_keywords = true;
    preview.by_type = true;
    preview.by_keyword = false;
    preview.validate()?;
    let root = scanner::ensure_directory(directory)?;

    let scanned = scanner::scan(&root, &preview, scan_cfg)?;
    let mut records = scanned.records;
    let mut errors = scanned.errors;
    errors.extend(extractor::load_texts(&mut records, scan_cfg.max_text_bytes));
    KeywordExtractor::new(preview.top_n, preview.min_score).apply(&mut records);
    records.retain(|r| r.text.is_some());
    for r in records.iter_mut() {
        r.text = None;
    }
    Ok((records, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateZone;
    use std::fs;

    fn settings(exts: &[&str]) -> OrganizationSettings {
        OrganizationSettings {
            extensions: exts.iter().map(|s| s.to_string()).collect(),
            date_zone: DateZone::Utc,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_settings_fail_before_scanning() {
        let mut s = settings(&[".txt"]);
        s.by_keyword = true;
        s.extract_keywords = false;
        let err = plan(Path::new("/definitely/not/here"), &s, &ScanConfig::default()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("keyword"));
    }

    #[test]
    fn missing_directory_is_configuration_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = plan(
            &temp.path().join("gone"),
            &settings(&[".txt"]),
            &ScanConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn keyword_plan_uses_batch_scores() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("b.txt"), "project travel itinerary itinerary").unwrap();
        fs::write(root.join("a.txt"), "project budget budget forecast").unwrap();
        fs::write(root.join("c.pdf"), "%PDF-1.4 binary").unwrap();

        let mut s = settings(&[".txt", ".pdf"]);
        s.by_type = false;
        s.by_keyword = true;
        s.min_score = 0.05;
        let p = plan(root, &s, &ScanConfig::default()).unwrap();

        let dests: Vec<String> = p.entries.iter().map(|e| e.relative_destination()).collect();
        assert_eq!(
            dests,
            vec!["budget/a.txt", "itinerary/b.txt", "uncategorized/c.pdf"]
        );
        assert!(p.entries.iter().all(|e| e.record.text.is_none()));
        assert!(p.scan_errors.is_empty());
    }

    #[test]
    fn undecodable_text_still_gets_planned() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("bad.txt"), [0xc3, 0x28, 0xff]).unwrap();

        let mut s = settings(&[".txt"]);
        s.by_keyword = true;
        let p = plan(root, &s, &ScanConfig::default()).unwrap();
        assert_eq!(p.entries.len(), 1);
        assert_eq!(p.entries[0].segments, vec!["txt", "uncategorized"]);
        assert_eq!(p.scan_errors.len(), 1);
        assert!(!p.scan_errors[0].excludes_file());
    }

    #[test]
    fn keyword_preview_lists_text_files_only() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("a.txt"), "invoice payment payment").unwrap();
        fs::write(root.join("b.pdf"), "%PDF").unwrap();

        let mut s = settings(&[".txt", ".pdf"]);
        s.by_type = false;
        s.by_date = true;
        s.extract_keywords = false;
        let (records, errors) = keywords(root, &s, &ScanConfig::default()).unwrap();
        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name(), "a.txt");
        assert_eq!(records[0].top_keyword().unwrap().term, "payment");
    }
}
