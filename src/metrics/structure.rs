//! Structure: internal consistency of field names and value shapes.

use crate::record::{FieldValue, Record};
use crate::rules::CategoryRules;

use super::{ratio_or_full, Issue, IssueCode, MetricOutcome};

/// Why a field is structurally inconsistent, if it is.
fn inconsistency(name: &str, value: &FieldValue, rules: &CategoryRules) -> Option<String> {
    if name.trim().is_empty() {
        return Some("field name is blank".to_string());
    }
    if name.trim() != name {
        return Some("field name has surrounding whitespace".to_string());
    }
    if let Some(kind) = rules.expected_types.get(name) {
        if !value.matches_kind(*kind) {
            return Some(format!("expected a {} value", kind));
        }
    }
    if value.is_deeply_nested() {
        return Some("value is nested more than one level deep".to_string());
    }
    None
}

/// Score the share of fields that are structurally consistent.
///
/// An empty record is trivially consistent.
pub fn score(record: &Record, rules: &CategoryRules) -> MetricOutcome {
    let mut issues = Vec::new();

    for (name, value) in record.fields() {
        if let Some(reason) = inconsistency(name, value, rules) {
            issues.push(Issue::field(IssueCode::StructuralMismatch, name, reason));
        }
    }

    let consistent = record.len() - issues.len();
    MetricOutcome::new(ratio_or_full(consistent, record.len()), issues)
}
