//! Core library: scanning, keyword extraction, classification, safe moves.

pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod extractor;
pub mod keywords;
pub mod lemmatizer;
pub mod models;
pub mod mover;
pub mod pipeline;
pub mod planner;
pub mod scanner;
pub mod stopwords;

pub use crate::error::OrganizeError;
pub use crate::pipeline::{run, RunReport};
