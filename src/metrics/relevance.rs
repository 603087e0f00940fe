//! Relevance: lexical overlap with the rainwater-harvesting domain.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::record::Record;
use crate::rules::CategoryRules;

use super::{Issue, IssueCode, MetricContext, MetricOutcome};

/// Keywords every category is matched against.
pub const DOMAIN_KEYWORDS: &[&str] = &[
    "water",
    "rainwater",
    "harvesting",
    "rainfall",
    "conservation",
    "subsidy",
    "irrigation",
    "groundwater",
    "recharge",
    "watershed",
    "monsoon",
    "storage",
    "tank",
];

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
}

/// Lowercased word tokens of `text`.
fn tokens(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// A keyword matches at the start of a word, so "tank" finds "tanks" but
/// "water" does not find "rainwater". Multi-word keywords must match
/// consecutive words.
fn mentions(words: &[String], keyword: &str) -> bool {
    let parts = tokens(keyword);
    if parts.is_empty() {
        return false;
    }
    words
        .windows(parts.len())
        .any(|w| w.iter().zip(&parts).all(|(word, part)| word.starts_with(part.as_str())))
}

/// Distinct keywords (domain plus category) found in the record's text,
/// sorted for stable output.
pub fn matched_keywords(record: &Record, rules: &CategoryRules) -> Vec<String> {
    let words = tokens(&record.text_content().join(" "));
    if words.is_empty() {
        return Vec::new();
    }

    let keywords: BTreeSet<String> = DOMAIN_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .chain(rules.keywords.iter().map(|k| k.trim().to_lowercase()))
        .filter(|k| !k.is_empty())
        .collect();

    keywords.into_iter().filter(|k| mentions(&words, k)).collect()
}

/// Score `min(1, hits / target)` over distinct keyword hits.
pub fn score(record: &Record, rules: &CategoryRules, ctx: &MetricContext) -> MetricOutcome {
    let hits = matched_keywords(record, rules).len();
    let target = ctx.tuning.relevance_target.max(1);
    let score = (hits as f64 / target as f64).min(1.0);

    let mut issues = Vec::new();
    if score < ctx.tuning.issue_threshold {
        issues.push(Issue::record(
            IssueCode::LowRelevance,
            format!("{} of {} expected domain keywords found", hits, target),
        ));
    }

    MetricOutcome::new(score, issues)
}
