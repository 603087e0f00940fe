//! Core types shared by the metric calculators.

use serde::{Deserialize, Serialize};

/// Machine-readable issue labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    MissingField,
    InvalidCurrencyFormat,
    InvalidUrlFormat,
    InvalidEmailFormat,
    InvalidDateFormat,
    InvalidNumber,
    OutOfRange,
    InvalidLength,
    InvalidValue,
    MissingAmount,
    InvalidTimestamp,
    StaleData,
    LowRelevance,
    StructuralMismatch,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::MissingField => "MISSING_FIELD",
            IssueCode::InvalidCurrencyFormat => "INVALID_CURRENCY_FORMAT",
            IssueCode::InvalidUrlFormat => "INVALID_URL_FORMAT",
            IssueCode::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            IssueCode::InvalidDateFormat => "INVALID_DATE_FORMAT",
            IssueCode::InvalidNumber => "INVALID_NUMBER",
            IssueCode::OutOfRange => "OUT_OF_RANGE",
            IssueCode::InvalidLength => "INVALID_LENGTH",
            IssueCode::InvalidValue => "INVALID_VALUE",
            IssueCode::MissingAmount => "MISSING_AMOUNT",
            IssueCode::InvalidTimestamp => "INVALID_TIMESTAMP",
            IssueCode::StaleData => "STALE_DATA",
            IssueCode::LowRelevance => "LOW_RELEVANCE",
            IssueCode::StructuralMismatch => "STRUCTURAL_MISMATCH",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single problem found on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    /// Field the issue is about; `None` for record-level issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn field(code: IssueCode, field: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn record(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            field: None,
            message: message.into(),
        }
    }

    /// Issue key as used in reports: `CODE` or `CODE:field`.
    pub fn key(&self) -> String {
        match &self.field {
            Some(field) => format!("{}:{}", self.code, field),
            None => self.code.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.key(), self.message)
    }
}

/// Sub-score and issues produced by one calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricOutcome {
    pub score: f64,
    pub issues: Vec<Issue>,
}

impl MetricOutcome {
    /// Build an outcome, clamping the score into [0, 1].
    pub fn new(score: f64, issues: Vec<Issue>) -> Self {
        Self {
            score: clamp_unit(score),
            issues,
        }
    }

    pub fn perfect() -> Self {
        Self::new(1.0, Vec::new())
    }
}

/// Clamp into the unit interval; NaN maps to 0.
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// `passed / total`, or 1.0 when there was nothing to check.
pub fn ratio_or_full(passed: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        passed as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_key() {
        let missing = Issue::field(IssueCode::MissingField, "price", "missing");
        assert_eq!(missing.key(), "MISSING_FIELD:price");
        let stale = Issue::record(IssueCode::StaleData, "old");
        assert_eq!(stale.key(), "STALE_DATA");
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.0000000001), 1.0);
        assert_eq!(clamp_unit(-0.1), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }

    #[test]
    fn test_serialized_issue_code() {
        let issue = Issue::field(IssueCode::InvalidCurrencyFormat, "price", "bad");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["code"], "INVALID_CURRENCY_FORMAT");
        assert_eq!(json["field"], "price");
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for code in [
            IssueCode::InvalidLength,
            IssueCode::InvalidValue,
            IssueCode::MissingAmount,
            IssueCode::StructuralMismatch,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }
}
