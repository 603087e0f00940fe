//! Loading scraped records from JSON and exporting accepted ones.
//!
//! A JSON file holds either an array of records, whose category comes from
//! the caller or the file stem, or an object mapping category names to
//! arrays of records. Directories are walked for `*.json` files.

use anyhow::Context;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::record::Record;

/// Records of one category gathered from one or more files.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    pub category: String,
    pub records: Vec<Record>,
}

/// Collect JSON files under a directory, sorted for stable output.
fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden directories
            let name = e.file_name().to_string_lossy();
            !(e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

fn records_from(value: Value, origin: &str) -> anyhow::Result<Vec<Record>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value(item)
                    .with_context(|| format!("{}: record {} is not an object", origin, i))
            })
            .collect(),
        other => anyhow::bail!(
            "{}: expected an array of records, found {}",
            origin,
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse one JSON document into record sets.
///
/// For an array, `category` names the set. For an object keyed by category,
/// `category`, when given, selects a single entry.
pub fn parse_records(
    content: &str,
    category: &str,
    only: Option<&str>,
) -> anyhow::Result<Vec<RecordSet>> {
    let value: Value = serde_json::from_str(content).context("invalid JSON")?;

    match value {
        Value::Object(map) => {
            let mut sets = Vec::new();
            for (name, items) in map {
                if only.is_some_and(|c| c != name) {
                    continue;
                }
                let records = records_from(items, &name)?;
                sets.push(RecordSet {
                    category: name,
                    records,
                });
            }
            Ok(sets)
        }
        other => Ok(vec![RecordSet {
            category: category.to_string(),
            records: records_from(other, category)?,
        }]),
    }
}

/// Load every record under `path`, merging sets that share a category.
///
/// Categories are returned in the order they are first encountered.
pub fn load_path(path: &Path, category: Option<&str>) -> anyhow::Result<Vec<RecordSet>> {
    let metadata =
        fs::metadata(path).with_context(|| format!("cannot access path {}", path.display()))?;
    let files = if metadata.is_dir() {
        collect_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        warn!(path = %path.display(), "no JSON files found");
    }

    let mut merged: Vec<RecordSet> = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        let default_category = category.unwrap_or(stem);
        let sets = parse_records(&content, default_category, category)
            .with_context(|| format!("failed to load {}", file.display()))?;

        for set in sets {
            debug!(
                file = %file.display(),
                category = %set.category,
                records = set.records.len(),
                "loaded records"
            );
            match merged.iter_mut().find(|m| m.category == set.category) {
                Some(existing) => existing.records.extend(set.records),
                None => merged.push(set),
            }
        }
    }

    info!(
        files = files.len(),
        records = merged.iter().map(|s| s.records.len()).sum::<usize>(),
        "input loaded"
    );
    Ok(merged)
}

/// Write `{category: [records]}` as pretty JSON.
pub fn export_records(path: &Path, sets: &[(String, Vec<Record>)]) -> anyhow::Result<()> {
    let document: BTreeMap<&str, &[Record]> = sets
        .iter()
        .map(|(category, records)| (category.as_str(), records.as_slice()))
        .collect();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(&document)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "exported valid records");
    Ok(())
}
