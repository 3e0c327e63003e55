//! Batch TF-IDF keyword extraction.
//!
//! Inverse document frequency is computed over every text file in the run,
//! so a file's keywords are the terms that set it apart from the rest of the
//! batch. Scoring per file in isolation would change the results.

use crate::lemmatizer::lemmatize;
use crate::models::{FileRecord, Keyword};
use crate::stopwords::is_stop_word;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct KeywordExtractor {
    pub top_n: usize,
    pub min_score: f64,
}

impl KeywordExtractor {
    pub fn new(top_n: usize, min_score: f64) -> Self {
        Self { top_n, min_score }
    }

    /// Scores every record that carries text. Records without text map to an
    /// empty list.
    pub fn extract(&self, batch: &[FileRecord]) -> BTreeMap<PathBuf, Vec<Keyword>> {
        let docs: Vec<(&PathBuf, HashMap<String, usize>)> = batch
            .iter()
            .filter_map(|r| r.text.as_deref().map(|t| (&r.path, term_counts(t))))
            .collect();

        let n_docs = docs.len() as f64;
        let mut df: HashMap<&str, usize> = HashMap::new();
        for (_, counts) in &docs {
            for term in counts.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut out: BTreeMap<PathBuf, Vec<Keyword>> = batch
            .iter()
            .map(|r| (r.path.clone(), Vec::new()))
            .collect();

        for (path, counts) in &docs {
            let weights: Vec<(&str, f64)> = counts
                .iter()
                .map(|(term, &count)| {
                    let doc_freq = df.get(term.as_str()).copied().unwrap_or(1) as f64;
                    let idf = ((1.0 + n_docs) / (1.0 + doc_freq)).ln() + 1.0;
                    (term.as_str(), count as f64 * idf)
                })
                .collect();
            let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm == 0.0 {
                continue;
            }

            let mut scored: Vec<Keyword> = weights
                .into_iter()
                .map(|(term, w)| Keyword {
                    term: term.to_string(),
                    score: w / norm,
                })
                .filter(|k| k.score >= self.min_score)
                .collect();
            scored.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.term.cmp(&b.term))
            });
            scored.truncate(self.top_n);
            debug!("{:?}: {} keywords", path, scored.len());
            out.insert((*path).clone(), scored);
        }
        out
    }

    /// Runs [`extract`](Self::extract) and stores the lists on the records.
    pub fn apply(&self, batch: &mut [FileRecord]) {
        let mut scored = self.extract(batch);
        for record in batch.iter_mut() {
            record.keywords = Some(scored.remove(&record.path).unwrap_or_default());
        }
    }
}

/// Lowercases, splits into words, drops stop words and anything that isn't
/// purely alphabetic, then lemmatizes.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && w.chars().all(char::is_alphabetic))
        .filter(|w| !is_stop_word(w))
        .map(lemmatize)
        .collect()
}

fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}
