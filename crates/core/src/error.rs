//! Error taxonomy for an organize run.
//!
//! [`OrganizeError`] is what aborts a run, always before anything on disk
//! changed. Scan and move failures are recorded per file as [`ScanError`] and
//! [`MoveError`] and carried in the report instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl OrganizeError {
    pub fn config(msg: impl Into<String>) -> Self {
        OrganizeError::Configuration(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, OrganizeError::Configuration(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    /// Size or modification time could not be read; the file is left out of the plan.
    Metadata,
    /// Text could not be read or decoded; the file only loses its keywords.
    Content,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("scan failed for {path:?} ({stage}): {message}")]
pub struct ScanError {
    pub path: PathBuf,
    pub stage: ScanStage,
    pub message: String,
}

impl ScanError {
    pub fn metadata(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            stage: ScanStage::Metadata,
            message: err.to_string(),
        }
    }

    pub fn content(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            stage: ScanStage::Content,
            message: err.to_string(),
        }
    }

    pub fn excludes_file(&self) -> bool {
        self.stage == ScanStage::Metadata
    }
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStage::Metadata => f.write_str("metadata"),
            ScanStage::Content => f.write_str("content"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStage {
    CreateDir,
    Collision,
    Rename,
    Copy,
    Verify,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("move failed for {path:?} during {stage:?}: {message}")]
pub struct MoveError {
    pub path: PathBuf,
    pub stage: MoveStage,
    pub message: String,
}

impl MoveError {
    pub fn new(path: impl Into<PathBuf>, stage: MoveStage, err: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            stage,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrganizeError>;
