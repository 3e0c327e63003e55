use crate::error::OrganizeError;
use crate::models::OTHER;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Extensions with a named type folder. Anything else can only be picked up
/// through the `other` bucket.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".csv", ".log", ".json", ".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png",
    ".gif", ".mp3", ".wav", ".flac", ".mp4", ".mov", ".mkv", ".zip", ".tar", ".gz", ".7z", ".py",
    ".rs", ".js",
];

/// Extensions whose content is read as plain text for keyword extraction.
pub const TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".csv", ".log", ".json", ".py", ".rs", ".js",
];

pub fn is_known_extension(ext: &str) -> bool {
    KNOWN_EXTENSIONS.contains(&ext)
}

pub fn is_text_extension(ext: &str) -> bool {
    TEXT_EXTENSIONS.contains(&ext)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub organize: OrganizationSettings,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateZone {
    #[default]
    Local,
    Utc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSettings {
    /// Selected extensions (`.txt`), plus the `other` sentinel for the catch-all bucket.
    #[serde(default = "default_extensions")]
    pub extensions: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub by_type: bool,
    #[serde(default)]
    pub by_date: bool,
    #[serde(default)]
    pub by_size: bool,
    #[serde(default)]
    pub by_keyword: bool,
    #[serde(default = "default_true")]
    pub extract_keywords: bool,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default)]
    pub date_zone: DateZone,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            by_type: true,
            by_date: false,
            by_size: false,
            by_keyword: false,
            extract_keywords: true,
            top_n: default_top_n(),
            min_score: default_min_score(),
            date_zone: DateZone::Local,
        }
    }
}

/// Result of a successful [`OrganizationSettings::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated {
    /// Recognized extensions that stay untouched even though `other` is selected.
    pub shadowed_by_other: Vec<String>,
}

impl OrganizationSettings {
    pub fn any_strategy(&self) -> bool {
        self.by_type || self.by_date || self.by_size || self.by_keyword
    }

    pub fn other_enabled(&self) -> bool {
        self.extensions.contains(OTHER)
    }

    /// Whether a file with this normalized extension takes part in a run.
    pub fn selects(&self, ext: &str) -> bool {
        if self.extensions.contains(ext) {
            return true;
        }
        self.other_enabled() && !is_known_extension(ext)
    }

    pub fn wants_text(&self) -> bool {
        self.extract_keywords
    }

    /// Normalizes user input such as `TXT` or `txt` to `.txt`.
    pub fn normalize_extensions(&mut self) {
        self.extensions = self
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
    }

    pub fn validate(&self) -> Result<Validated, OrganizeError> {
        if self.by_keyword && !self.extract_keywords {
            return Err(OrganizeError::config(
                "organizing by keyword requires keyword extraction to be enabled",
            ));
        }
        if !self.any_strategy() {
            return Err(OrganizeError::config(
                "no organization strategy enabled (by_type, by_date, by_size, by_keyword)",
            ));
        }
        if self.extensions.is_empty() {
            return Err(OrganizeError::config("no file type selected"));
        }
        if self.top_n == 0 {
            return Err(OrganizeError::config("top_n must be at least 1"));
        }
        if !(self.min_score > 0.0 && self.min_score <= 1.0) {
            return Err(OrganizeError::config(format!(
                "min_score must be in (0, 1], got {}",
                self.min_score
            )));
        }

        let shadowed_by_other = if self.other_enabled() {
            KNOWN_EXTENSIONS
                .iter()
                .filter(|e| !self.extensions.contains(**e))
                .map(|e| e.to_string())
                .collect()
        } else {
            Vec::new()
        };
        Ok(Validated { shadowed_by_other })
    }
}

pub fn normalize_extension(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() || trimmed == OTHER {
        return trimmed;
    }
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            exclude: Vec::new(),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

impl ScanConfig {
    pub fn exclude_set(&self) -> Result<GlobSet, OrganizeError> {
        let mut builder = GlobSetBuilder::new();
        for pat in &self.exclude {
            let glob = Glob::new(pat)
                .map_err(|e| OrganizeError::config(format!("invalid exclude pattern {pat:?}: {e}")))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| OrganizeError::config(format!("invalid exclude patterns: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default)]
    pub dry_run: bool,
    /// Compare digests of source and copy before deleting the source on a
    /// cross-device move.
    #[serde(default = "default_true")]
    pub verify_copy: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            verify_copy: true,
        }
    }
}

fn default_extensions() -> BTreeSet<String> {
    [".txt", ".pdf"].iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    5
}

fn default_min_score() -> f64 {
    0.1
}

fn default_max_text_bytes() -> usize {
    1024 * 1024
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("ORGANIZER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    let mut app: AppConfig = cfg.try_deserialize()?;
    app.organize.normalize_extensions();
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(exts: &[&str]) -> OrganizationSettings {
        OrganizationSettings {
            extensions: exts.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn keyword_strategy_requires_extraction() {
        let mut s = settings(&[".txt"]);
        s.by_keyword = true;
        s.extract_keywords = false;
        let err = s.validate().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn no_strategy_is_rejected() {
        let mut s = settings(&[".txt"]);
        s.by_type = false;
        assert!(s.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn no_extension_is_rejected() {
        let s = settings(&[]);
        assert!(s.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn min_score_range_is_checked() {
        let mut s = settings(&[".txt"]);
        s.min_score = 0.0;
        assert!(s.validate().is_err());
        s.min_score = 1.0;
        assert!(s.validate().is_ok());
        s.min_score = 1.5;
        assert!(s.validate().is_err());
    }

    #[test]
    fn other_catches_only_unrecognized_extensions() {
        let s = settings(&[".txt", "other"]);
        assert!(s.selects(".txt"));
        assert!(s.selects(".xyz"));
        assert!(s.selects(OTHER));
        assert!(!s.selects(".py"));

        let v = s.validate().unwrap();
        assert!(v.shadowed_by_other.contains(&".py".to_string()));
        assert!(!v.shadowed_by_other.contains(&".txt".to_string()));
    }

    #[test]
    fn without_other_only_selected_extensions() {
        let s = settings(&[".txt"]);
        assert!(s.selects(".txt"));
        assert!(!s.selects(".xyz"));
        assert!(!s.selects(OTHER));
        assert!(s.validate().unwrap().shadowed_by_other.is_empty());
    }

    #[test]
    fn extensions_are_normalized() {
        let mut s = settings(&["TXT", ".Md", "Other", " "]);
        s.normalize_extensions();
        let got: Vec<&str> = s.extensions.iter().map(String::as_str).collect();
        assert_eq!(got, vec![".md", ".txt", "other"]);
    }

    #[test]
    fn bad_exclude_glob_is_configuration_error() {
        let scan = ScanConfig {
            exclude: vec!["[".into()],
            ..Default::default()
        };
        assert!(scan.exclude_set().unwrap_err().is_configuration());
    }
}
