//! Composite quality scoring.
//!
//! Combines the five metric sub-scores into one overall score in [0, 1]
//! using fixed weights, and gathers the issues each metric raised.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConfigError, Result};
use crate::metrics::{clamp_unit, Issue, MetricContext, MetricKind, ScoringTuning};
use crate::record::Record;
use crate::rules::RuleRegistry;

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Weight of each metric in the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub completeness: f64,
    pub accuracy: f64,
    pub freshness: f64,
    pub relevance: f64,
    pub structure: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            completeness: 0.30,
            accuracy: 0.25,
            freshness: 0.20,
            relevance: 0.15,
            structure: 0.10,
        }
    }
}

impl QualityWeights {
    pub fn weight(&self, metric: MetricKind) -> f64 {
        match metric {
            MetricKind::Completeness => self.completeness,
            MetricKind::Accuracy => self.accuracy,
            MetricKind::Freshness => self.freshness,
            MetricKind::Relevance => self.relevance,
            MetricKind::Structure => self.structure,
        }
    }

    pub fn sum(&self) -> f64 {
        MetricKind::ALL.iter().map(|m| self.weight(*m)).sum()
    }

    /// Each weight must be finite and non-negative, and together they must
    /// sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        for metric in MetricKind::ALL {
            let value = self.weight(metric);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    metric: metric.to_string(),
                    value,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Quality assessment of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Weighted overall score in [0, 1].
    pub overall: f64,
    pub sub_scores: BTreeMap<MetricKind, f64>,
    pub issues: Vec<Issue>,
}

impl ScoreResult {
    pub fn sub_score(&self, metric: MetricKind) -> f64 {
        self.sub_scores.get(&metric).copied().unwrap_or(0.0)
    }

    /// Issue keys (`CODE` or `CODE:field`) in the order they were raised.
    pub fn issue_keys(&self) -> Vec<String> {
        self.issues.iter().map(Issue::key).collect()
    }
}

/// Scores records against their category rules.
///
/// The reference time used for freshness is fixed at construction so
/// every record in a batch is judged against the same instant.
#[derive(Debug, Clone)]
pub struct Scorer {
    registry: RuleRegistry,
    weights: QualityWeights,
    tuning: ScoringTuning,
    now: DateTime<Utc>,
}

impl Scorer {
    /// Create a scorer, rejecting malformed weights or tuning.
    pub fn new(
        registry: RuleRegistry,
        weights: QualityWeights,
        tuning: ScoringTuning,
    ) -> Result<Self> {
        weights.validate()?;
        tuning.validate()?;
        Ok(Self {
            registry,
            weights,
            tuning,
            now: Utc::now(),
        })
    }

    /// Override the reference time used for freshness.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn weights(&self) -> &QualityWeights {
        &self.weights
    }

    /// Score a single record.
    ///
    /// Never fails: malformed data scores low and shows up in `issues`.
    pub fn validate_record(&self, record: &Record, category: &str) -> ScoreResult {
        let rules = self.registry.rules_for(category);
        let ctx = MetricContext {
            now: self.now,
            tuning: &self.tuning,
        };

        let mut sub_scores = BTreeMap::new();
        let mut issues = Vec::new();
        let mut overall = 0.0;

        for metric in MetricKind::ALL {
            let outcome = metric.calculate(record, rules, &ctx);
            overall += self.weights.weight(metric) * outcome.score;
            sub_scores.insert(metric, outcome.score);
            issues.extend(outcome.issues);
        }

        ScoreResult {
            overall: clamp_unit(overall),
            sub_scores,
            issues,
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            registry: RuleRegistry::builtin(),
            weights: QualityWeights::default(),
            tuning: ScoringTuning::default(),
            now: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::IssueCode;
    use crate::record::FieldValue;
    use crate::rules::COST_INFORMATION;

    fn weighted_sum(result: &ScoreResult, weights: &QualityWeights) -> f64 {
        MetricKind::ALL
            .iter()
            .map(|m| weights.weight(*m) * result.sub_score(*m))
            .sum()
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = QualityWeights::default();
        assert!(weights.validate().is_ok());
        assert!((weights.sum() - 1.0).abs() <= WEIGHT_TOLERANCE);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = QualityWeights {
            structure: 0.2,
            ..Default::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = QualityWeights {
            completeness: 0.5,
            structure: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::NegativeWeight { ref metric, .. }) if metric == "structure"
        ));
    }

    #[test]
    fn test_scorer_new_rejects_bad_weights() {
        let weights = QualityWeights {
            accuracy: 0.5,
            ..Default::default()
        };
        let result = Scorer::new(RuleRegistry::builtin(), weights, ScoringTuning::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_good_cost_record() {
        let scorer = Scorer::default();
        let record = Record::new().with("item_name", "HDPE Tank").with("price", "₹5,000");
        let result = scorer.validate_record(&record, COST_INFORMATION);

        assert_eq!(result.sub_score(MetricKind::Completeness), 1.0);
        assert_eq!(result.sub_score(MetricKind::Accuracy), 1.0);
        assert!(result.overall >= 0.7, "overall was {}", result.overall);
        assert!(!result
            .issues
            .iter()
            .any(|i| i.code == IssueCode::MissingField));
    }

    #[test]
    fn test_bad_cost_record() {
        let scorer = Scorer::default();
        let record = Record::new().with("item_name", "").with("price", "five thousand");
        let result = scorer.validate_record(&record, COST_INFORMATION);

        assert_eq!(result.sub_score(MetricKind::Completeness), 0.5);
        assert_eq!(result.sub_score(MetricKind::Accuracy), 0.0);
        let keys = result.issue_keys();
        assert!(keys.contains(&"MISSING_FIELD:item_name".to_string()));
        assert!(keys.contains(&"INVALID_CURRENCY_FORMAT:price".to_string()));
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let scorer = Scorer::default();
        let records = vec![
            Record::new(),
            Record::new().with("item_name", "HDPE Tank").with("price", "₹5,000"),
            Record::new()
                .with("item_name", "Rainwater harvesting tank")
                .with("price", "Rs. 12,000")
                .with("source_url", "ftp//broken")
                .with("nested", FieldValue::List(vec![FieldValue::List(vec![])])),
        ];
        for record in &records {
            let result = scorer.validate_record(record, COST_INFORMATION);
            let expected = weighted_sum(&result, scorer.weights());
            assert!((result.overall - expected).abs() <= 1e-9);
            assert!((0.0..=1.0).contains(&result.overall));
            for metric in MetricKind::ALL {
                assert!((0.0..=1.0).contains(&result.sub_score(metric)));
            }
        }
    }

    #[test]
    fn test_unknown_category_degrades_gracefully() {
        let scorer = Scorer::default();
        let record = Record::new().with("headline", "Monsoon update");
        let result = scorer.validate_record(&record, "news_policy");
        assert_eq!(result.sub_score(MetricKind::Completeness), 1.0);
        assert_eq!(result.sub_score(MetricKind::Accuracy), 1.0);
        assert_eq!(result.sub_score(MetricKind::Freshness), 0.5);
    }

    #[test]
    fn test_perfect_record_scores_one() {
        let now = Utc::now();
        let scorer = Scorer::default().at(now);
        let record = Record::new()
            .with("item_name", "Rainwater harvesting storage tank")
            .with("price", "₹45,000")
            .with("extracted_date", now.to_rfc3339());
        let result = scorer.validate_record(&record, COST_INFORMATION);
        assert!((result.overall - 1.0).abs() <= 1e-9);
    }
}
