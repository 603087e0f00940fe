//! Format patterns used by the accuracy check.
//!
//! Regexes are compiled once and shared across all scorers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::FieldValue;

lazy_static! {
    /// Rupee amount with a mandatory currency marker, optionally a range
    /// ("₹8,000 - ₹12,000") and the "/-" suffix common on Indian price lists.
    static ref CURRENCY: Regex = Regex::new(
        r"^(?:₹|Rs\.?|RS\.?|rs\.?|INR)\s*\d+(?:,\d{2,3})*(?:\.\d{2})?(?:\s*/-)?(?:\s*(?:-|–|to)\s*(?:₹|Rs\.?|RS\.?|rs\.?|INR)?\s*\d+(?:,\d{2,3})*(?:\.\d{2})?(?:\s*/-)?)?$"
    ).unwrap();

    /// Scheme followed by a host name or bracketed IP literal.
    static ref URL: Regex = Regex::new(
        r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:[^\s/@]+@)?(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*|\[[0-9A-Fa-f:.]+\])(?::\d+)?(?:[/?#]\S*)?$"
    ).unwrap();

    static ref EMAIL: Regex = Regex::new(
        r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$"
    ).unwrap();

    /// Free text that at least names an amount: a digit or a rupee marker.
    static ref AMOUNT_MENTION: Regex = Regex::new(r"(?i)(\d|₹|\brs\b)").unwrap();

    /// Numbers inside currency text, thousands separators included.
    static ref AMOUNT_NUMBER: Regex = Regex::new(r"\d+(?:,\d+)*(?:\.\d+)?").unwrap();

    /// Date shapes seen in scheme deadlines: 31/03/2024, 2024-03-31,
    /// 31 Mar 2024, March 31, 2024.
    static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}").unwrap(),
        Regex::new(r"\d{4}[-/]\d{1,2}[-/]\d{1,2}").unwrap(),
        Regex::new(r"(?i)\d{1,2}\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{2,4}").unwrap(),
        Regex::new(r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{2,4}").unwrap(),
    ];
}

/// Kind of format check declared for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Currency,
    Url,
    Email,
    Date,
    /// Value must parse as a number; bounds come from the numeric range table.
    Numeric,
    /// Free text that mentions an amount, e.g. subsidy descriptions.
    Amount,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Currency => "currency",
            PatternKind::Url => "url",
            PatternKind::Email => "email",
            PatternKind::Date => "date",
            PatternKind::Numeric => "numeric",
            PatternKind::Amount => "amount",
        }
    }

    /// Check a value against this pattern.
    ///
    /// Non-negative numbers are accepted for currency fields; everything
    /// else must be text.
    pub fn matches(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (PatternKind::Currency, FieldValue::Number(n)) => n.is_finite() && *n >= 0.0,
            (PatternKind::Currency, FieldValue::Text(s)) => CURRENCY.is_match(s.trim()),
            (PatternKind::Url, FieldValue::Text(s)) => URL.is_match(s.trim()),
            (PatternKind::Email, FieldValue::Text(s)) => EMAIL.is_match(s.trim()),
            (PatternKind::Date, FieldValue::Text(s)) => {
                DATE_PATTERNS.iter().any(|re| re.is_match(s))
            }
            (PatternKind::Numeric, v) => v.as_number().is_some(),
            (PatternKind::Amount, FieldValue::Number(_)) => true,
            (PatternKind::Amount, FieldValue::Text(s)) => AMOUNT_MENTION.is_match(s),
            _ => false,
        }
    }
}

/// Every amount written in a currency value.
///
/// `"₹8,000 - ₹12,000"` yields both ends of the range; a bare number
/// yields itself.
pub fn currency_amounts(value: &FieldValue) -> Vec<f64> {
    match value {
        FieldValue::Number(n) if n.is_finite() => vec![*n],
        FieldValue::Text(s) => AMOUNT_NUMBER
            .find_iter(s)
            .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            .collect(),
        _ => Vec::new(),
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    #[test]
    fn test_currency_accepts_rupee_formats() {
        for ok in [
            "₹5,000",
            "₹ 5000",
            "Rs. 50,000",
            "Rs 1,00,000.00",
            "RS 250",
            "INR 12,500.50",
            "₹8,000 - ₹12,000",
            "₹180 - ₹250",
            "Rs. 4,500/-",
        ] {
            assert!(PatternKind::Currency.matches(&text(ok)), "{ok} should match");
        }
    }

    #[test]
    fn test_currency_rejects_unmarked_or_prose() {
        for bad in ["five thousand", "5000", "$5,000", "₹", "₹5,000.5", "about Rs. 500"] {
            assert!(!PatternKind::Currency.matches(&text(bad)), "{bad} should not match");
        }
    }

    #[test]
    fn test_currency_accepts_non_negative_numbers() {
        assert!(PatternKind::Currency.matches(&FieldValue::Number(5000.0)));
        assert!(!PatternKind::Currency.matches(&FieldValue::Number(-1.0)));
    }

    #[test]
    fn test_url() {
        assert!(PatternKind::Url.matches(&text("https://pmksy.gov.in/Guidelines.aspx")));
        assert!(PatternKind::Url.matches(&text("http://www.rainwaterharvesting.org/")));
        assert!(PatternKind::Url.matches(&text("https://localhost:8080")));
        assert!(!PatternKind::Url.matches(&text("pmksy.gov.in")));
        assert!(!PatternKind::Url.matches(&text("https://")));
        assert!(!PatternKind::Url.matches(&text("not a url")));
    }

    #[test]
    fn test_email() {
        assert!(PatternKind::Email.matches(&text("helpdesk@jalshakti.gov.in")));
        assert!(!PatternKind::Email.matches(&text("helpdesk@")));
        assert!(!PatternKind::Email.matches(&text("helpdesk.gov.in")));
    }

    #[test]
    fn test_date() {
        assert!(PatternKind::Date.matches(&text("31/03/2024")));
        assert!(PatternKind::Date.matches(&text("2024-03-31")));
        assert!(PatternKind::Date.matches(&text("31 Mar 2024")));
        assert!(PatternKind::Date.matches(&text("March 31, 2024")));
        assert!(!PatternKind::Date.matches(&text("end of the financial year")));
    }

    #[test]
    fn test_numeric() {
        assert!(PatternKind::Numeric.matches(&FieldValue::Number(12.0)));
        assert!(PatternKind::Numeric.matches(&text("1,200")));
        assert!(!PatternKind::Numeric.matches(&text("heavy")));
    }

    #[test]
    fn test_amount_mention() {
        assert!(PatternKind::Amount.matches(&text("Up to 50% of installation cost")));
        assert!(PatternKind::Amount.matches(&text("Subsidy in Rs. per household")));
        assert!(PatternKind::Amount.matches(&text("₹ as per district norms")));
        assert!(PatternKind::Amount.matches(&FieldValue::Number(25000.0)));
        assert!(!PatternKind::Amount.matches(&text("Available for all farmers")));
        assert!(!PatternKind::Amount.matches(&text("ours and theirs")));
    }

    #[test]
    fn test_currency_amounts() {
        assert_eq!(currency_amounts(&text("₹45,000")), vec![45000.0]);
        assert_eq!(currency_amounts(&text("Rs 1,00,000.00")), vec![100000.0]);
        assert_eq!(
            currency_amounts(&text("₹8,000 - ₹12,000")),
            vec![8000.0, 12000.0]
        );
        assert_eq!(currency_amounts(&FieldValue::Number(350.0)), vec![350.0]);
        assert!(currency_amounts(&text("five thousand")).is_empty());
    }
}
