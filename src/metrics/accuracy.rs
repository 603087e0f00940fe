//! Accuracy: share of format-checked fields whose values are well formed.

use crate::patterns::{currency_amounts, PatternKind};
use crate::record::{FieldValue, Record};
use crate::rules::CategoryRules;

use super::{ratio_or_full, Issue, IssueCode, MetricOutcome};

fn issue_code_for(kind: PatternKind) -> IssueCode {
    match kind {
        PatternKind::Currency => IssueCode::InvalidCurrencyFormat,
        PatternKind::Url => IssueCode::InvalidUrlFormat,
        PatternKind::Email => IssueCode::InvalidEmailFormat,
        PatternKind::Date => IssueCode::InvalidDateFormat,
        PatternKind::Numeric => IssueCode::InvalidNumber,
        PatternKind::Amount => IssueCode::MissingAmount,
    }
}

fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => format!("{:?}", s),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Null => "null".to_string(),
        FieldValue::List(_) => "a list".to_string(),
        FieldValue::Map(_) => "a map".to_string(),
    }
}

/// Check one field; returns the first failing check, in the order
/// pattern, length, vocabulary, range.
fn check_field(field: &str, value: &FieldValue, rules: &CategoryRules) -> Option<Issue> {
    if let Some(kind) = rules.format_patterns.get(field) {
        if !kind.matches(value) {
            return Some(Issue::field(
                issue_code_for(*kind),
                field,
                format!("{} is not a valid {} value", describe(value), kind),
            ));
        }
    }

    if let (Some(bounds), Some(text)) = (rules.length_bounds.get(field), value.as_text()) {
        let len = text.trim().chars().count();
        if !bounds.contains(len) {
            return Some(Issue::field(
                IssueCode::InvalidLength,
                field,
                format!("{} characters, expected {}", len, bounds),
            ));
        }
    }

    if let Some(allowed) = rules.allowed_values.get(field) {
        let known = value
            .as_text()
            .is_some_and(|s| allowed.iter().any(|a| a == s.trim()));
        if !known {
            return Some(Issue::field(
                IssueCode::InvalidValue,
                field,
                format!("{} is not one of {}", describe(value), allowed.join(", ")),
            ));
        }
    }

    let &(min, max) = rules.numeric_ranges.get(field)?;
    // Currency text carries its amounts behind a rupee marker.
    let numbers = match rules.format_patterns.get(field) {
        Some(PatternKind::Currency) => currency_amounts(value),
        _ => value.as_number().into_iter().collect(),
    };
    if numbers.is_empty() {
        return Some(Issue::field(
            IssueCode::InvalidNumber,
            field,
            format!("{} is not a number", describe(value)),
        ));
    }
    numbers
        .into_iter()
        .find(|n| *n < min || *n > max)
        .map(|n| {
            Issue::field(
                IssueCode::OutOfRange,
                field,
                format!("{} is outside the expected range [{}, {}]", n, min, max),
            )
        })
}

/// Score the fraction of pattern-checked fields that pass.
///
/// Fields without a declared pattern or range are not counted, and neither
/// are absent or blank fields: those are a completeness problem.
pub fn score(record: &Record, rules: &CategoryRules) -> MetricOutcome {
    let mut issues = Vec::new();
    let mut checked = 0;
    let mut passed = 0;

    for field in rules.checked_fields() {
        let Some(value) = record.non_blank(field) else {
            continue;
        };
        checked += 1;
        match check_field(field, value, rules) {
            Some(issue) => issues.push(issue),
            None => passed += 1,
        }
    }

    MetricOutcome::new(ratio_or_full(passed, checked), issues)
}
