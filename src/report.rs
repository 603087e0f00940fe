//! Validation reports and their output formats.
//!
//! A report is derived purely from a [`BatchResult`] and can be recomputed
//! at any time. Two output formats are supported:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::batch::BatchResult;
use crate::metrics::MetricKind;

/// Bucket boundaries: poor < 0.3 <= acceptable < 0.6 <= good < 0.8 <= excellent.
pub mod buckets {
    pub const ACCEPTABLE_MIN: f64 = 0.3;
    pub const GOOD_MIN: f64 = 0.6;
    pub const EXCELLENT_MIN: f64 = 0.8;
}

/// Number of issue rows shown in pretty output.
const TOP_ISSUES: usize = 10;

/// Histogram of overall scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDistribution {
    pub poor: usize,
    pub acceptable: usize,
    pub good: usize,
    pub excellent: usize,
}

impl QualityDistribution {
    fn add(&mut self, score: f64) {
        match score {
            s if s < buckets::ACCEPTABLE_MIN => self.poor += 1,
            s if s < buckets::GOOD_MIN => self.acceptable += 1,
            s if s < buckets::EXCELLENT_MIN => self.good += 1,
            _ => self.excellent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.poor + self.acceptable + self.good + self.excellent
    }
}

/// How often an issue key occurred across a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFrequency {
    pub issue: String,
    pub count: usize,
}

/// Summary of one validated batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub category: String,
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub min_quality: f64,
    pub average_quality: f64,
    pub passed: bool,
    pub distribution: QualityDistribution,
    /// Mean sub-score per metric; empty for an empty batch.
    pub metric_averages: BTreeMap<MetricKind, f64>,
    /// Sorted by descending count, ties in first-seen order.
    pub common_issues: Vec<IssueFrequency>,
}

/// Count issue keys across every record, valid and invalid.
fn issue_frequencies(batch: &BatchResult) -> Vec<IssueFrequency> {
    let mut order: Vec<IssueFrequency> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for issue in batch.results.iter().flat_map(|r| r.issues.iter()) {
        let key = issue.key();
        match index.get(&key) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push(IssueFrequency {
                    issue: key,
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so ties keep first-seen order
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order
}

fn metric_averages(batch: &BatchResult) -> BTreeMap<MetricKind, f64> {
    if batch.results.is_empty() {
        return BTreeMap::new();
    }
    let n = batch.results.len() as f64;
    MetricKind::ALL
        .iter()
        .map(|m| {
            let sum: f64 = batch.results.iter().map(|r| r.sub_score(*m)).sum();
            (*m, sum / n)
        })
        .collect()
}

/// Build the report for a batch.
pub fn generate_report(batch: &BatchResult) -> ValidationReport {
    let mut distribution = QualityDistribution::default();
    for score in &batch.scores {
        distribution.add(*score);
    }

    ValidationReport {
        category: batch.category.clone(),
        total: batch.total(),
        valid_count: batch.valid.len(),
        invalid_count: batch.invalid.len(),
        min_quality: batch.min_quality,
        average_quality: batch.average_quality,
        passed: batch.passed(),
        distribution,
        metric_averages: metric_averages(batch),
        common_issues: issue_frequencies(batch),
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document for a validation run.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub passed: bool,
    pub records_scanned: usize,
    pub categories: Vec<ValidationReport>,
}

impl JsonReport {
    pub fn new(path: &str, config: Option<&str>, reports: &[ValidationReport]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            config: config.map(str::to_string),
            passed: reports.iter().all(|r| r.passed),
            records_scanned: reports.iter().map(|r| r.total).sum(),
            categories: reports.to_vec(),
        }
    }
}

/// Render reports as pretty-printed JSON.
pub fn render_json(
    path: &str,
    config: Option<&str>,
    reports: &[ValidationReport],
) -> anyhow::Result<String> {
    let report = JsonReport::new(path, config, reports);
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write reports in JSON format to stdout.
pub fn write_json(
    path: &str,
    config: Option<&str>,
    reports: &[ValidationReport],
) -> anyhow::Result<()> {
    println!("{}", render_json(path, config, reports)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write reports in pretty (human-readable) format.
pub fn write_pretty(path: &str, config: Option<&str>, reports: &[ValidationReport]) {
    println!();
    print!("  ");
    print!("{}", "jalsetu".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", config.unwrap_or("(built-in defaults)"));
    println!();

    if reports.is_empty() {
        println!("  {}", "No records found".dimmed());
        println!();
        return;
    }

    for report in reports {
        write_category(report);
        println!();
    }

    write_final_status(reports);
    println!();
}

fn write_category(report: &ValidationReport) {
    if report.passed {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }
    print!("  {}", report.category.bold());
    print!("  Average: ");
    write_colored_score(report.average_quality);
    println!(
        "  {}",
        format!("(threshold {:.2})", report.min_quality).dimmed()
    );

    println!(
        "    {} records: {} valid, {} invalid",
        report.total,
        report.valid_count.to_string().green(),
        if report.invalid_count > 0 {
            report.invalid_count.to_string().red()
        } else {
            report.invalid_count.to_string().normal()
        }
    );

    let d = &report.distribution;
    println!(
        "    {} poor {}  acceptable {}  good {}  excellent {}",
        "Distribution:".dimmed(),
        d.poor,
        d.acceptable,
        d.good,
        d.excellent
    );

    if !report.metric_averages.is_empty() {
        let metrics: Vec<String> = report
            .metric_averages
            .iter()
            .map(|(m, v)| format!("{} {:.2}", m, v))
            .collect();
        println!("    {} {}", "Metrics:".dimmed(), metrics.join("  "));
    }

    if !report.common_issues.is_empty() {
        println!("    {}", "Common issues:".bold());
        for entry in report.common_issues.iter().take(TOP_ISSUES) {
            println!("      {:<40} {:>5}", entry.issue.yellow(), entry.count);
        }
        let hidden = report.common_issues.len().saturating_sub(TOP_ISSUES);
        if hidden > 0 {
            println!("      {}", format!("... and {} more", hidden).dimmed());
        }
    }
}

fn write_colored_score(s: f64) {
    let text = format!("{:.3}", s);
    match s {
        s if s >= buckets::EXCELLENT_MIN => print!("{}", text.green().bold()),
        s if s >= buckets::GOOD_MIN => print!("{}", text.green()),
        s if s >= buckets::ACCEPTABLE_MIN => print!("{}", text.yellow()),
        _ => print!("{}", text.red()),
    }
}

fn write_final_status(reports: &[ValidationReport]) {
    let total: usize = reports.iter().map(|r| r.total).sum();
    let valid: usize = reports.iter().map(|r| r.valid_count).sum();
    print!(
        "  {}",
        format!("{} of {} records accepted", valid, total).dimmed()
    );
    print!("  ");
    if reports.iter().all(|r| r.passed) {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchValidator, MinQuality};
    use crate::metrics::{Issue, IssueCode};
    use crate::record::Record;
    use crate::rules::COST_INFORMATION;
    use crate::score::ScoreResult;

    fn batch_with(scores: &[f64], issues: &[&[Issue]]) -> BatchResult {
        let results: Vec<ScoreResult> = scores
            .iter()
            .zip(issues.iter())
            .map(|(s, i)| ScoreResult {
                overall: *s,
                sub_scores: MetricKind::ALL.iter().map(|m| (*m, *s)).collect(),
                issues: i.to_vec(),
            })
            .collect();
        BatchResult {
            category: "test".to_string(),
            min_quality: 0.3,
            valid: Vec::new(),
            invalid: Vec::new(),
            scores: scores.to_vec(),
            results,
            average_quality: scores.iter().sum::<f64>() / scores.len().max(1) as f64,
        }
    }

    fn missing(field: &str) -> Issue {
        Issue::field(IssueCode::MissingField, field, "missing")
    }

    #[test]
    fn test_histogram_buckets() {
        let batch = batch_with(&[0.1, 0.5, 0.7, 0.95], &[&[], &[], &[], &[]]);
        let report = generate_report(&batch);
        assert_eq!(
            report.distribution,
            QualityDistribution {
                poor: 1,
                acceptable: 1,
                good: 1,
                excellent: 1
            }
        );
    }

    #[test]
    fn test_histogram_boundaries() {
        let batch = batch_with(&[0.0, 0.3, 0.6, 0.8, 1.0], &[&[], &[], &[], &[], &[]]);
        let d = generate_report(&batch).distribution;
        assert_eq!((d.poor, d.acceptable, d.good, d.excellent), (1, 1, 1, 2));
        assert_eq!(d.total(), 5);
    }

    #[test]
    fn test_common_issues_sorted_with_first_seen_ties() {
        let stale = Issue::record(IssueCode::StaleData, "old");
        let batch = batch_with(
            &[0.2, 0.4, 0.9],
            &[
                &[missing("price"), stale.clone()],
                &[missing("item_name"), stale.clone()],
                &[missing("item_name"), missing("price")],
            ],
        );
        let report = generate_report(&batch);
        let table: Vec<(&str, usize)> = report
            .common_issues
            .iter()
            .map(|e| (e.issue.as_str(), e.count))
            .collect();
        assert_eq!(
            table,
            vec![
                ("MISSING_FIELD:price", 2),
                ("STALE_DATA", 2),
                ("MISSING_FIELD:item_name", 2),
            ]
        );
    }

    #[test]
    fn test_report_from_real_batch() {
        let validator = BatchValidator::default();
        let records = vec![
            Record::new().with("item_name", "HDPE Tank").with("price", "₹5,000"),
            Record::new().with("item_name", "").with("price", "five thousand"),
        ];
        let batch =
            validator.validate_batch(&records, COST_INFORMATION, MinQuality::new(0.5).unwrap());
        let report = generate_report(&batch);

        assert_eq!(report.total, 2);
        assert_eq!(report.valid_count, 1);
        assert_eq!(report.invalid_count, 1);
        assert_eq!(report.metric_averages.len(), 5);
        assert_eq!(report.metric_averages[&MetricKind::Completeness], 0.75);
        assert!(report
            .common_issues
            .iter()
            .any(|e| e.issue == "INVALID_CURRENCY_FORMAT:price"));
    }

    #[test]
    fn test_empty_batch_report() {
        let batch = BatchValidator::default().validate_batch(
            &[],
            COST_INFORMATION,
            MinQuality::new(0.3).unwrap(),
        );
        let report = generate_report(&batch);
        assert_eq!(report.total, 0);
        assert_eq!(report.distribution.total(), 0);
        assert!(report.metric_averages.is_empty());
        assert!(report.common_issues.is_empty());
        assert!(report.passed);
    }

    #[test]
    fn test_render_json() {
        let batch = batch_with(&[0.9], &[&[missing("title")]]);
        let report = generate_report(&batch);
        let json = render_json("records.json", None, &[report]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["records_scanned"], 1);
        assert_eq!(parsed["passed"], true);
        assert_eq!(parsed["categories"][0]["category"], "test");
        assert_eq!(
            parsed["categories"][0]["common_issues"][0]["issue"],
            "MISSING_FIELD:title"
        );
        assert!(parsed.get("config").is_none());
    }
}
