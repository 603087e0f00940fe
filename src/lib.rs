//! Jalsetu - data-quality gate for scraped rainwater-harvesting records.
//!
//! Every record is scored on five metrics against the rules of its
//! category, the weighted sum decides whether it is kept, and a report
//! summarizes what went wrong across the batch.
//!
//! # Architecture
//!
//! - `record`: scraped records as field → value maps
//! - `rules`: per-category field rules and the rule registry
//! - `patterns`: pre-compiled format patterns (currency, URL, email, date)
//! - `metrics`: the five metric calculators and issue codes
//! - `score`: weighted composite scoring
//! - `batch`: batch validation, thresholds and deduplication
//! - `report`: report generation and output formatting (text, JSON)
//! - `config`: YAML quality configuration
//! - `dataset`: JSON input loading and export
//!
//! # Example
//!
//! ```
//! use jalsetu::{BatchValidator, MinQuality, Record};
//!
//! let records = vec![Record::new()
//!     .with("item_name", "HDPE Tank")
//!     .with("price", "₹5,000")];
//! let validator = BatchValidator::default();
//! let result = validator.validate_batch(&records, "cost_information", MinQuality::new(0.3).unwrap());
//! assert_eq!(result.valid.len(), 1);
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod patterns;
pub mod record;
pub mod report;
pub mod rules;
pub mod score;

pub use batch::{dedupe, BatchResult, BatchValidator, InvalidRecord, MinQuality};
pub use config::QualityConfig;
pub use error::ConfigError;
pub use metrics::{Issue, IssueCode, MetricKind, ScoringTuning};
pub use record::{FieldValue, Record, ValueKind};
pub use report::{generate_report, ValidationReport};
pub use rules::{CategoryRules, RuleRegistry};
pub use score::{QualityWeights, ScoreResult, Scorer};
