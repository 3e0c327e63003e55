use crate::error::MoveError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension sentinel for files without a (recognized) extension.
pub const OTHER: &str = "other";

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Lowercase with leading dot (`.txt`), or [`OTHER`] when the name has none.
    pub ext: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    #[serde(skip)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<Keyword>>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: DateTime<Utc>) -> Self {
        let path = path.into();
        let ext = normalized_ext(&path);
        Self {
            path,
            ext,
            size,
            modified,
            text: None,
            keywords: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn top_keyword(&self) -> Option<&Keyword> {
        self.keywords.as_ref().and_then(|k| k.first())
    }
}

pub fn normalized_ext(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_else(|| OTHER.to_string())
}

/// Fixed size classes. Lower bounds are inclusive: exactly 1 MiB is `Small`,
/// exactly 100 MiB is `Large`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    Tiny,
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub const SMALL_MIN: u64 = MIB;
    pub const MEDIUM_MIN: u64 = 10 * MIB;
    pub const LARGE_MIN: u64 = 100 * MIB;

    pub fn from_size(size: u64) -> Self {
        if size >= Self::LARGE_MIN {
            SizeBucket::Large
        } else if size >= Self::MEDIUM_MIN {
            SizeBucket::Medium
        } else if size >= Self::SMALL_MIN {
            SizeBucket::Small
        } else {
            SizeBucket::Tiny
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::Tiny => "tiny",
            SizeBucket::Small => "small",
            SizeBucket::Medium => "medium",
            SizeBucket::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovePlanEntry {
    pub record: FileRecord,
    /// Folder names below the root, outermost first.
    pub segments: Vec<String>,
}

impl MovePlanEntry {
    pub fn destination_dir(&self, root: &Path) -> PathBuf {
        self.segments
            .iter()
            .fold(root.to_path_buf(), |dir, seg| dir.join(seg))
    }

    pub fn destination(&self, root: &Path) -> PathBuf {
        self.destination_dir(root).join(self.record.file_name())
    }

    pub fn relative_destination(&self) -> String {
        let mut parts = self.segments.clone();
        parts.push(self.record.file_name());
        parts.join("/")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Dry run: the file would be moved here.
    Planned { destination: PathBuf },
    Moved { destination: PathBuf },
    /// Moved under a disambiguated name because the plain name was taken.
    Renamed { destination: PathBuf },
    Failed { error: MoveError },
    /// Not attempted, e.g. the run was cancelled first.
    Skipped { reason: String },
}

impl MoveOutcome {
    pub fn destination(&self) -> Option<&Path> {
        match self {
            MoveOutcome::Planned { destination }
            | MoveOutcome::Moved { destination }
            | MoveOutcome::Renamed { destination } => Some(destination),
            MoveOutcome::Failed { .. } | MoveOutcome::Skipped { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoveOutcome::Planned { .. } => "planned",
            MoveOutcome::Moved { .. } => "moved",
            MoveOutcome::Renamed { .. } => "renamed",
            MoveOutcome::Failed { .. } => "failed",
            MoveOutcome::Skipped { .. } => "skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResult {
    pub entry: MovePlanEntry,
    pub outcome: MoveOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub planned: usize,
    pub moved: usize,
    pub renamed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub scan_errors: usize,
}

impl RunSummary {
    pub fn from_results(results: &[MoveResult], scan_errors: usize) -> Self {
        let mut summary = RunSummary {
            scan_errors,
            ..Default::default()
        };
        for r in results {
            match r.outcome {
                MoveOutcome::Planned { .. } => summary.planned += 1,
                MoveOutcome::Moved { .. } => summary.moved += 1,
                MoveOutcome::Renamed { .. } => summary.renamed += 1,
                MoveOutcome::Failed { .. } => summary.failed += 1,
                MoveOutcome::Skipped { .. } => summary.skipped += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_is_lowercased_with_dot() {
        assert_eq!(normalized_ext(Path::new("/tmp/Report.TXT")), ".txt");
        assert_eq!(normalized_ext(Path::new("/tmp/archive.tar.gz")), ".gz");
        assert_eq!(normalized_ext(Path::new("/tmp/Makefile")), OTHER);
    }

    #[test]
    fn size_bucket_boundaries_are_inclusive_lower() {
        assert_eq!(SizeBucket::from_size(0), SizeBucket::Tiny);
        assert_eq!(SizeBucket::from_size(MIB - 1), SizeBucket::Tiny);
        assert_eq!(SizeBucket::from_size(MIB), SizeBucket::Small);
        assert_eq!(SizeBucket::from_size(10 * MIB - 1), SizeBucket::Small);
        assert_eq!(SizeBucket::from_size(10 * MIB), SizeBucket::Medium);
        assert_eq!(SizeBucket::from_size(100 * MIB - 1), SizeBucket::Medium);
        assert_eq!(SizeBucket::from_size(100 * MIB), SizeBucket::Large);
        assert_eq!(SizeBucket::from_size(u64::MAX), SizeBucket::Large);
    }

    #[test]
    fn destination_joins_segments_then_name() {
        let entry = MovePlanEntry {
            record: FileRecord::new("/data/report.txt", 10, Utc::now()),
            segments: vec!["txt".into(), "2024-03".into()],
        };
        assert_eq!(
            entry.destination(Path::new("/data")),
            PathBuf::from("/data/txt/2024-03/report.txt")
        );
        assert_eq!(entry.relative_destination(), "txt/2024-03/report.txt");
    }
}
