//! Maps a file record to its destination folder segments.
//!
//! Pure: no I/O, and the same record and settings always give the same
//! segments. Strategies contribute in fixed order: type, date, size, keyword.

use crate::config::{is_known_extension, DateZone, OrganizationSettings};
use crate::models::{FileRecord, SizeBucket, OTHER};
use chrono::Local;

/// Folder used by the keyword strategy when a file has no keywords.
pub const UNCATEGORIZED: &str = "uncategorized";

pub fn classify(record: &FileRecord, settings: &OrganizationSettings) -> Vec<String> {
    let mut segments = Vec::with_capacity(4);
    if settings.by_type {
        segments.push(type_segment(&record.ext, settings));
    }
    if settings.by_date {
        segments.push(date_segment(record, settings.date_zone));
    }
    if settings.by_size {
        segments.push(SizeBucket::from_size(record.size).label().to_string());
    }
    if settings.by_keyword {
        segments.push(keyword_segment(record));
    }
    segments
}

pub fn type_segment(ext: &str, settings: &OrganizationSettings) -> String {
    if ext != OTHER && settings.extensions.contains(ext) && is_known_extension(ext) {
        ext.trim_start_matches('.').to_string()
    } else {
        OTHER.to_string()
    }
}

pub fn date_segment(record: &FileRecord, zone: DateZone) -> String {
    match zone {
        DateZone::Utc => record.modified.format("%Y-%m").to_string(),
        DateZone::Local => record.modified.with_timezone(&Local).format("%Y-%m").to_string(),
    }
}

pub fn keyword_segment(record: &FileRecord) -> String {
    record
        .top_keyword()
        .map(|k| folder_safe(&k.term))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Replaces every non-alphanumeric character with `_`.
pub fn folder_safe(term: &str) -> String {
    term.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
