//! Quality configuration loaded from YAML.
//!
//! A configuration sets acceptance thresholds per category, the metric
//! weights, freshness/relevance tuning, and any extra categories beyond
//! the built-in four.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::batch::{BatchValidator, MinQuality};
use crate::error::Result;
use crate::metrics::ScoringTuning;
use crate::rules::{
    CategoryRules, RuleRegistry, COST_INFORMATION, GOVERNMENT_SCHEMES, TECHNICAL_RESOURCES,
    WEATHER_DATA,
};
use crate::score::{QualityWeights, Scorer};

/// Threshold for categories without an entry in `thresholds`.
pub const DEFAULT_MIN_QUALITY: f64 = 0.3;

fn default_min_quality() -> f64 {
    DEFAULT_MIN_QUALITY
}

fn default_thresholds() -> BTreeMap<String, f64> {
    [
        (GOVERNMENT_SCHEMES, 0.4),
        (WEATHER_DATA, 0.3),
        (COST_INFORMATION, 0.3),
        (TECHNICAL_RESOURCES, 0.4),
    ]
    .into_iter()
    .map(|(c, t)| (c.to_string(), t))
    .collect()
}

/// Top-level quality configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Fallback threshold for categories not listed in `thresholds`.
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,
    /// Per-category acceptance thresholds. Replaces the built-in table
    /// when present.
    #[serde(default = "default_thresholds")]
    pub thresholds: BTreeMap<String, f64>,
    #[serde(default)]
    pub weights: QualityWeights,
    #[serde(default)]
    pub tuning: ScoringTuning,
    /// Extra or overriding category rules.
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryRules>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: String::new(),
            description: None,
            min_quality: DEFAULT_MIN_QUALITY,
            thresholds: default_thresholds(),
            weights: QualityWeights::default(),
            tuning: ScoringTuning::default(),
            categories: BTreeMap::new(),
        }
    }
}

impl QualityConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: QualityConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Acceptance threshold for a category.
    pub fn threshold_for(&self, category: &str) -> Result<MinQuality> {
        let value = self
            .thresholds
            .get(category)
            .copied()
            .unwrap_or(self.min_quality);
        MinQuality::new(value)
    }

    /// Built-in rules plus every category declared here.
    pub fn registry(&self) -> Result<RuleRegistry> {
        let mut registry = RuleRegistry::builtin();
        for (category, rules) in &self.categories {
            registry.register(category, rules.clone())?;
        }
        Ok(registry)
    }

    pub fn scorer(&self) -> Result<Scorer> {
        Scorer::new(self.registry()?, self.weights.clone(), self.tuning.clone())
    }

    pub fn validator(&self) -> Result<BatchValidator> {
        Ok(BatchValidator::new(self.scorer()?))
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &QualityConfig) -> anyhow::Result<()> {
    MinQuality::new(config.min_quality).context("invalid min_quality")?;

    for (category, value) in &config.thresholds {
        MinQuality::new(*value)
            .with_context(|| format!("invalid threshold for category {:?}", category))?;
    }

    config.weights.validate().context("invalid weights")?;
    config.tuning.validate().context("invalid tuning")?;

    for (category, rules) in &config.categories {
        if category.trim().is_empty() {
            anyhow::bail!("category names must not be blank");
        }
        rules.validate(category)?;
    }

    Ok(())
}
