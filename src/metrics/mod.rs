//! Quality metrics computed for each record.
//!
//! Each metric is a pure function of a record and its category rules (plus
//! the scoring context for the time- and keyword-based ones) returning a
//! sub-score in [0, 1] and the issues behind it.

pub mod accuracy;
pub mod completeness;
pub mod freshness;
pub mod relevance;
pub mod structure;
mod types;

pub use types::{clamp_unit, ratio_or_full, Issue, IssueCode, MetricOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::record::Record;
use crate::rules::CategoryRules;

/// The five weighted quality metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Completeness,
    Accuracy,
    Freshness,
    Relevance,
    Structure,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Completeness,
        MetricKind::Accuracy,
        MetricKind::Freshness,
        MetricKind::Relevance,
        MetricKind::Structure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Completeness => "completeness",
            MetricKind::Accuracy => "accuracy",
            MetricKind::Freshness => "freshness",
            MetricKind::Relevance => "relevance",
            MetricKind::Structure => "structure",
        }
    }

    /// Run this metric's calculator.
    pub fn calculate(
        &self,
        record: &Record,
        rules: &CategoryRules,
        ctx: &MetricContext,
    ) -> MetricOutcome {
        match self {
            MetricKind::Completeness => completeness::score(record, rules),
            MetricKind::Accuracy => accuracy::score(record, rules),
            MetricKind::Freshness => freshness::score(record, rules, ctx),
            MetricKind::Relevance => relevance::score(record, rules, ctx),
            MetricKind::Structure => structure::score(record, rules),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tunable constants for the freshness and relevance metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Data younger than this scores full freshness.
    pub fresh_window_hours: i64,
    /// Data older than this scores the freshness floor.
    pub stale_after_days: i64,
    pub freshness_floor: f64,
    /// Freshness when a record has no timestamp at all.
    pub freshness_neutral: f64,
    /// Distinct keyword hits needed for full relevance.
    pub relevance_target: usize,
    /// Sub-score below which STALE_DATA / LOW_RELEVANCE are raised.
    pub issue_threshold: f64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            fresh_window_hours: 24,
            stale_after_days: 30,
            freshness_floor: 0.2,
            freshness_neutral: 0.5,
            relevance_target: 3,
            issue_threshold: 0.5,
        }
    }
}

impl ScoringTuning {
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("freshness_floor", self.freshness_floor),
            ("freshness_neutral", self.freshness_neutral),
            ("issue_threshold", self.issue_threshold),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidTuning {
                    name: name.to_string(),
                    reason: format!("must be within [0.0, 1.0], got {}", value),
                });
            }
        }
        if self.fresh_window_hours < 0 {
            return Err(ConfigError::InvalidTuning {
                name: "fresh_window_hours".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        if self.fresh_window_hours.checked_mul(3600).is_none() {
            return Err(ConfigError::InvalidTuning {
                name: "fresh_window_hours".to_string(),
                reason: format!("{} hours is out of range", self.fresh_window_hours),
            });
        }
        let horizon_hours = self
            .stale_after_days
            .checked_mul(86_400)
            .and_then(|_| self.stale_after_days.checked_mul(24))
            .ok_or_else(|| ConfigError::InvalidTuning {
                name: "stale_after_days".to_string(),
                reason: format!("{} days is out of range", self.stale_after_days),
            })?;
        if horizon_hours <= self.fresh_window_hours {
            return Err(ConfigError::InvalidTuning {
                name: "stale_after_days".to_string(),
                reason: "staleness horizon must lie beyond the fresh window".to_string(),
            });
        }
        if self.relevance_target == 0 {
            return Err(ConfigError::InvalidTuning {
                name: "relevance_target".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Inputs shared by every calculator during one scoring run.
#[derive(Debug, Clone, Copy)]
pub struct MetricContext<'a> {
    /// Reference instant for freshness.
    pub now: DateTime<Utc>,
    pub tuning: &'a ScoringTuning,
}
