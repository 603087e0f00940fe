//! Completeness: share of required fields that carry a value.

use crate::record::Record;
use crate::rules::CategoryRules;

use super::{ratio_or_full, Issue, IssueCode, MetricOutcome};

/// Score the fraction of required fields present and non-blank.
///
/// Empty strings, whitespace-only strings and nulls count as absent.
pub fn score(record: &Record, rules: &CategoryRules) -> MetricOutcome {
    let mut issues = Vec::new();
    let mut present = 0;

    for field in &rules.required_fields {
        if record.non_blank(field).is_some() {
            present += 1;
        } else {
            issues.push(Issue::field(
                IssueCode::MissingField,
                field,
                format!("required field {:?} is missing or blank", field),
            ));
        }
    }

    MetricOutcome::new(ratio_or_full(present, rules.required_fields.len()), issues)
}
