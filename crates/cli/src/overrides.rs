use clap::Args;
use organizer_core::config::{normalize_extension, AppConfig, DateZone};

/// Command-line overrides layered on top of the loaded configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// File types to process (comma-separated), e.g. txt,pdf,other
    #[arg(long = "ext", value_delimiter = ',', num_args = 1..)]
    pub extensions: Vec<String>,
    /// Group by file type (`--by-type=false` to turn off)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub by_type: Option<bool>,
    /// Group by modification month (YYYY-MM)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub by_date: Option<bool>,
    /// Group by size class (tiny|small|medium|large)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub by_size: Option<bool>,
    /// Group by top TF-IDF keyword
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub by_keyword: Option<bool>,
    /// Disable keyword extraction
    #[arg(long, default_value_t = false)]
    pub no_keywords: bool,
    /// Number of keywords kept per file
    #[arg(long)]
    pub top_n: Option<usize>,
    /// Minimum keyword score in (0, 1]
    #[arg(long)]
    pub min_score: Option<f64>,
    /// Compute date folders in UTC instead of local time
    #[arg(long, default_value_t = false)]
    pub utc: bool,
    /// Include dot-files
    #[arg(long, default_value_t = false)]
    pub include_hidden: bool,
    /// Skip file names matching these globs (comma-separated)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub exclude: Vec<String>,
}

impl SettingsArgs {
    pub fn apply(&self, cfg: &mut AppConfig) {
        let org = &mut cfg.organize;
        if !self.extensions.is_empty() {
            org.extensions = self
                .extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect();
        }
        if let Some(v) = self.by_type {
            org.by_type = v;
        }
        if let Some(v) = self.by_date {
            org.by_date = v;
        }
        if let Some(v) = self.by_size {
            org.by_size = v;
        }
        if let Some(v) = self.by_keyword {
            org.by_keyword = v;
        }
        if self.no_keywords {
            org.extract_keywords = false;
        }
        if let Some(n) = self.top_n {
            org.top_n = n;
        }
        if let Some(s) = self.min_score {
            org.min_score = s;
        }
        if self.utc {
            org.date_zone = DateZone::Utc;
        }
        if self.include_hidden {
            cfg.scan.include_hidden = true;
        }
        if !self.exclude.is_empty() {
            cfg.scan.exclude.extend(self.exclude.iter().cloned());
        }
    }
}
