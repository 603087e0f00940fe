//! Batch validation: score a sequence of records and split them by quality.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::metrics::Issue;
use crate::record::Record;
use crate::score::{ScoreResult, Scorer};

/// Fields whose normalized content identifies a record for deduplication.
const CONTENT_KEY_FIELDS: &[&str] = &[
    "scheme_name",
    "content",
    "source_text",
    "item_name",
    "material",
    "title",
];

/// Minimum overall score for a record to be accepted.
///
/// Validated on construction; a negative or >1 threshold is a
/// configuration error, not something to discover mid-batch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MinQuality(f64);

impl MinQuality {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for MinQuality {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        MinQuality::new(value).map_err(serde::de::Error::custom)
    }
}

/// A rejected record and the issues that explain its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidRecord {
    pub record: Record,
    pub score: f64,
    pub issues: Vec<Issue>,
}

/// Outcome of validating one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub category: String,
    pub min_quality: f64,
    /// Accepted records, in input order.
    pub valid: Vec<Record>,
    /// Rejected records, in input order.
    pub invalid: Vec<InvalidRecord>,
    /// Overall score of every input record, index-aligned with the input.
    pub scores: Vec<f64>,
    /// Full assessment of every input record, index-aligned with the input.
    pub results: Vec<ScoreResult>,
    /// Mean of `scores`; 0.0 for an empty batch.
    pub average_quality: f64,
}

impl BatchResult {
    fn new(category: &str, min_quality: MinQuality, capacity: usize) -> Self {
        Self {
            category: category.to_string(),
            min_quality: min_quality.value(),
            valid: Vec::new(),
            invalid: Vec::new(),
            scores: Vec::with_capacity(capacity),
            results: Vec::with_capacity(capacity),
            average_quality: 0.0,
        }
    }

    fn push(&mut self, record: &Record, result: ScoreResult) {
        self.scores.push(result.overall);
        if result.overall >= self.min_quality {
            self.valid.push(record.clone());
        } else {
            debug!(
                category = %self.category,
                score = result.overall,
                issues = ?result.issue_keys(),
                "record rejected"
            );
            self.invalid.push(InvalidRecord {
                record: record.clone(),
                score: result.overall,
                issues: result.issues.clone(),
            });
        }
        self.results.push(result);
    }

    fn finish(mut self) -> Self {
        self.average_quality = if self.scores.is_empty() {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / self.scores.len() as f64
        };
        info!(
            category = %self.category,
            total = self.total(),
            valid = self.valid.len(),
            invalid = self.invalid.len(),
            average_quality = self.average_quality,
            "batch validated"
        );
        self
    }

    pub fn total(&self) -> usize {
        self.scores.len()
    }

    /// Whether the batch's average meets its own threshold.
    ///
    /// An empty batch passes: nothing was scraped, nothing was wrong.
    pub fn passed(&self) -> bool {
        self.scores.is_empty() || self.average_quality >= self.min_quality
    }
}

/// Applies a [`Scorer`] to whole batches.
#[derive(Debug, Clone, Default)]
pub struct BatchValidator {
    scorer: Scorer,
}

impl BatchValidator {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Score every record once, in order, and partition by `min_quality`.
    ///
    /// A record scoring exactly the threshold is accepted.
    pub fn validate_batch(
        &self,
        records: &[Record],
        category: &str,
        min_quality: MinQuality,
    ) -> BatchResult {
        let mut batch = BatchResult::new(category, min_quality, records.len());
        for record in records {
            let result = self.scorer.validate_record(record, category);
            batch.push(record, result);
        }
        batch.finish()
    }

    /// Same as [`validate_batch`](Self::validate_batch) but scores records
    /// on the rayon pool. Output order matches the input.
    pub fn validate_batch_parallel(
        &self,
        records: &[Record],
        category: &str,
        min_quality: MinQuality,
    ) -> BatchResult {
        let results: Vec<ScoreResult> = records
            .par_iter()
            .map(|record| self.scorer.validate_record(record, category))
            .collect();

        let mut batch = BatchResult::new(category, min_quality, records.len());
        for (record, result) in records.iter().zip(results) {
            batch.push(record, result);
        }
        batch.finish()
    }
}

/// Normalized content key, or `None` when the record has no content fields.
fn content_key(record: &Record) -> Option<String> {
    let parts: Vec<String> = CONTENT_KEY_FIELDS
        .iter()
        .filter_map(|f| record.non_blank(f))
        .filter_map(|v| v.as_text())
        .map(|s| s.trim().to_lowercase())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\u{1f}"))
    }
}

/// Drop records whose content repeats an earlier record's.
///
/// Records without any content field are always kept.
pub fn dedupe(records: Vec<Record>) -> Vec<Record> {
    let before = records.len();
    let mut seen = HashSet::new();
    let unique: Vec<Record> = records
        .into_iter()
        .filter(|record| match content_key(record) {
            Some(key) => seen.insert(key),
            None => true,
        })
        .collect();

    if unique.len() < before {
        info!(removed = before - unique.len(), "removed duplicate records");
    }
    unique
}
