//! Tests for the JSON report and export formats.
//!
//! Downstream tooling reads these documents, so field names and shapes
//! are checked explicitly.

use std::path::PathBuf;

use jalsetu::config::QualityConfig;
use jalsetu::dataset;
use jalsetu::report::{self, JsonReport, ValidationReport};
use jalsetu::{dedupe, generate_report};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn fixture_reports() -> Vec<ValidationReport> {
    let config = QualityConfig::parse_file(testdata_path().join("test-config.yaml"))
        .expect("should parse config");
    let validator = config.validator().expect("should build validator");
    let sets = dataset::load_path(&testdata_path().join("records").join("mixed.json"), None)
        .expect("should load records");

    sets.into_iter()
        .map(|set| {
            let threshold = config.threshold_for(&set.category).unwrap();
            let result = validator.validate_batch(&dedupe(set.records), &set.category, threshold);
            generate_report(&result)
        })
        .collect()
}

#[test]
fn test_json_report_structure() {
    let reports = fixture_reports();
    let json = report::render_json("testdata/records/mixed.json", Some("test-config.yaml"), &reports)
        .expect("should render");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    assert_eq!(parsed["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(parsed["path"], "testdata/records/mixed.json");
    assert_eq!(parsed["config"], "test-config.yaml");
    assert_eq!(parsed["records_scanned"], 5);
    assert_eq!(parsed["passed"], true);
    assert_eq!(parsed["categories"].as_array().map(|a| a.len()), Some(3));
}

#[test]
fn test_json_category_field_names() {
    let reports = fixture_reports();
    let value = serde_json::to_value(&reports[0]).unwrap();
    let obj = value.as_object().expect("report is an object");

    for field in [
        "category",
        "total",
        "valid_count",
        "invalid_count",
        "min_quality",
        "average_quality",
        "passed",
        "distribution",
        "metric_averages",
        "common_issues",
    ] {
        assert!(obj.contains_key(field), "missing field {}", field);
    }

    let distribution = value["distribution"].as_object().unwrap();
    let mut buckets: Vec<&str> = distribution.keys().map(String::as_str).collect();
    buckets.sort_unstable();
    assert_eq!(buckets, vec!["acceptable", "excellent", "good", "poor"]);

    let metrics = value["metric_averages"].as_object().unwrap();
    for metric in ["completeness", "accuracy", "freshness", "relevance", "structure"] {
        assert!(metrics.contains_key(metric), "missing metric {}", metric);
    }
}

#[test]
fn test_json_common_issues_format() {
    let reports = fixture_reports();
    let schemes = reports
        .iter()
        .find(|r| r.category == "government_schemes")
        .expect("schemes report");
    let value = serde_json::to_value(schemes).unwrap();
    let issues = value["common_issues"].as_array().unwrap();
    assert!(!issues.is_empty());
    for entry in issues {
        assert!(entry["issue"].is_string());
        assert!(entry["count"].is_u64());
    }

    let counts: Vec<u64> = issues.iter().filter_map(|e| e["count"].as_u64()).collect();
    let mut sorted = counts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(counts, sorted);
}

#[test]
fn test_json_report_deserializes() {
    let reports = fixture_reports();
    let json = report::render_json("mixed.json", None, &reports).unwrap();
    let parsed: JsonReport = serde_json::from_str(&json).expect("should deserialize");
    assert_eq!(parsed.categories, reports);
    assert!(parsed.config.is_none());
}

#[test]
fn test_failing_category_marks_report_failed() {
    let mut reports = fixture_reports();
    reports[0].passed = false;
    let json = report::render_json("mixed.json", None, &reports).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["passed"], false);
}

#[test]
fn test_export_contains_only_valid_records() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("valid.json");

    let config = QualityConfig::default();
    let validator = config.validator().unwrap();
    let sets = dataset::load_path(
        &testdata_path().join("records").join("cost_information.json"),
        None,
    )
    .unwrap();
    let set = &sets[0];
    let result = validator.validate_batch(
        &dedupe(set.records.clone()),
        &set.category,
        config.threshold_for(&set.category).unwrap(),
    );
    dataset::export_records(&out, &[(result.category.clone(), result.valid.clone())]).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let exported = written["cost_information"].as_array().unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[1]["item_name"], "PVC pipe 4 inch");
    assert_eq!(exported[1]["price"], 350.0);
}
