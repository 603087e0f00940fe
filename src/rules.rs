//! Per-category field rules.
//!
//! The registry maps a record category to the fields it must carry, the
//! format each field should follow, and the numeric bounds it should fall
//! within. Unknown categories get an empty rule set so that ad-hoc
//! categories introduced by the export pipeline still score.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{ConfigError, Result};
use crate::patterns::PatternKind;
use crate::record::ValueKind;

pub const GOVERNMENT_SCHEMES: &str = "government_schemes";
pub const WEATHER_DATA: &str = "weather_data";
pub const COST_INFORMATION: &str = "cost_information";
pub const TECHNICAL_RESOURCES: &str = "technical_resources";

/// Field names checked for a freshness timestamp, in priority order.
pub const DEFAULT_TIMESTAMP_FIELDS: &[&str] =
    &["extracted_date", "timestamp", "scraped_at", "last_updated"];

/// Inclusive character-count bounds for a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    #[serde(default)]
    pub min: usize,
    /// No upper bound when absent.
    #[serde(default)]
    pub max: Option<usize>,
}

impl LengthBounds {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && self.max.map_or(true, |max| len <= max)
    }
}

impl std::fmt::Display for LengthBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..={} characters", self.min, max),
            None => write!(f, "at least {} characters", self.min),
        }
    }
}

/// Validation rules for one record category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRules {
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Fields that are nice to have; informational only.
    #[serde(default)]
    pub optional_fields: Vec<String>,
    #[serde(default)]
    pub format_patterns: BTreeMap<String, PatternKind>,
    /// Inclusive `[min, max]` bounds.
    #[serde(default)]
    pub numeric_ranges: BTreeMap<String, (f64, f64)>,
    /// Character-count bounds on text fields.
    #[serde(default)]
    pub length_bounds: BTreeMap<String, LengthBounds>,
    /// Closed vocabularies: the value must be one of these exactly.
    #[serde(default)]
    pub allowed_values: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub expected_types: BTreeMap<String, ValueKind>,
    /// Extra relevance keywords on top of the domain set.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_timestamp_fields")]
    pub timestamp_fields: Vec<String>,
}

fn default_timestamp_fields() -> Vec<String> {
    DEFAULT_TIMESTAMP_FIELDS.iter().map(|s| s.to_string()).collect()
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            optional_fields: Vec::new(),
            format_patterns: BTreeMap::new(),
            numeric_ranges: BTreeMap::new(),
            length_bounds: BTreeMap::new(),
            allowed_values: BTreeMap::new(),
            expected_types: BTreeMap::new(),
            keywords: Vec::new(),
            timestamp_fields: default_timestamp_fields(),
        }
    }
}

impl CategoryRules {
    /// Fields subject to any accuracy check, in name order.
    pub fn checked_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .format_patterns
            .keys()
            .chain(self.numeric_ranges.keys())
            .chain(self.length_bounds.keys())
            .chain(self.allowed_values.keys())
            .map(String::as_str)
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    /// Check that ranges and length bounds are ordered and that every
    /// vocabulary is non-empty.
    pub fn validate(&self, category: &str) -> Result<()> {
        for (field, &(min, max)) in &self.numeric_ranges {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ConfigError::InvalidRange {
                    category: category.to_string(),
                    field: field.clone(),
                    min,
                    max,
                });
            }
        }
        for (field, bounds) in &self.length_bounds {
            if let Some(max) = bounds.max {
                if bounds.min > max {
                    return Err(ConfigError::InvalidLengthBounds {
                        category: category.to_string(),
                        field: field.clone(),
                        min: bounds.min,
                        max,
                    });
                }
            }
        }
        for (field, values) in &self.allowed_values {
            if values.is_empty() {
                return Err(ConfigError::EmptyAllowedValues {
                    category: category.to_string(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn patterns(items: &[(&str, PatternKind)]) -> BTreeMap<String, PatternKind> {
    items.iter().map(|(f, k)| (f.to_string(), *k)).collect()
}

fn lengths(items: &[(&str, usize, Option<usize>)]) -> BTreeMap<String, LengthBounds> {
    items
        .iter()
        .map(|(f, min, max)| (f.to_string(), LengthBounds::new(*min, *max)))
        .collect()
}

fn types(items: &[(&str, ValueKind)]) -> BTreeMap<String, ValueKind> {
    let mut map: BTreeMap<String, ValueKind> = [
        ("extracted_date", ValueKind::Text),
        ("source_url", ValueKind::Text),
    ]
    .iter()
    .map(|(f, k)| (f.to_string(), *k))
    .collect();
    map.extend(items.iter().map(|(f, k)| (f.to_string(), *k)));
    map
}

fn government_schemes() -> CategoryRules {
    CategoryRules {
        required_fields: strings(&["scheme_name", "content"]),
        optional_fields: strings(&[
            "eligibility",
            "subsidy_info",
            "subsidy_amount",
            "deadline",
            "contact",
            "contact_email",
            "key_features",
        ]),
        format_patterns: patterns(&[
            ("subsidy_amount", PatternKind::Currency),
            ("deadline", PatternKind::Date),
            ("source_url", PatternKind::Url),
            ("contact_email", PatternKind::Email),
            ("subsidy_info", PatternKind::Amount),
        ]),
        length_bounds: lengths(&[("scheme_name", 5, Some(200))]),
        expected_types: types(&[
            ("scheme_name", ValueKind::Text),
            ("content", ValueKind::Text),
            ("eligibility", ValueKind::Scalar),
            ("subsidy_amount", ValueKind::Scalar),
            ("key_features", ValueKind::List),
        ]),
        keywords: strings(&["scheme", "yojana", "beneficiary", "grant"]),
        ..CategoryRules::default()
    }
}

fn weather_data() -> CategoryRules {
    CategoryRules {
        required_fields: strings(&["location", "source_text"]),
        optional_fields: strings(&["rainfall_mm", "temperature_c", "humidity_percent", "date"]),
        format_patterns: patterns(&[
            ("rainfall_mm", PatternKind::Numeric),
            ("temperature_c", PatternKind::Numeric),
            ("humidity_percent", PatternKind::Numeric),
            ("source_url", PatternKind::Url),
        ]),
        numeric_ranges: [
            ("rainfall_mm", (0.0, 10_000.0)),
            ("temperature_c", (-50.0, 60.0)),
            ("humidity_percent", (0.0, 100.0)),
        ]
        .iter()
        .map(|(f, r)| (f.to_string(), *r))
        .collect(),
        expected_types: types(&[
            ("location", ValueKind::Text),
            ("rainfall_mm", ValueKind::Number),
            ("temperature_c", ValueKind::Number),
            ("humidity_percent", ValueKind::Number),
        ]),
        keywords: strings(&["precipitation", "weather", "climate", "forecast"]),
        ..CategoryRules::default()
    }
}

fn cost_information() -> CategoryRules {
    CategoryRules {
        required_fields: strings(&["item_name", "price"]),
        optional_fields: strings(&["unit", "material", "supplier", "supplier_email"]),
        format_patterns: patterns(&[
            ("price", PatternKind::Currency),
            ("source_url", PatternKind::Url),
            ("supplier_email", PatternKind::Email),
        ]),
        // Upper bound is one crore.
        numeric_ranges: [("price".to_string(), (0.0, 10_000_000.0))]
            .into_iter()
            .collect(),
        length_bounds: lengths(&[("material", 2, Some(100))]),
        expected_types: types(&[
            ("item_name", ValueKind::Text),
            ("price", ValueKind::Scalar),
            ("unit", ValueKind::Text),
            ("supplier", ValueKind::Scalar),
        ]),
        keywords: strings(&["pipe", "filter", "pump", "installation", "gutter"]),
        ..CategoryRules::default()
    }
}

fn technical_resources() -> CategoryRules {
    CategoryRules {
        required_fields: strings(&["title", "content"]),
        optional_fields: strings(&["type", "key_points", "document_url"]),
        format_patterns: patterns(&[
            ("source_url", PatternKind::Url),
            ("document_url", PatternKind::Url),
        ]),
        length_bounds: lengths(&[("content", 50, None)]),
        allowed_values: [(
            "type".to_string(),
            strings(&["technical_specification", "procedure", "regulation", "general"]),
        )]
        .into_iter()
        .collect(),
        expected_types: types(&[
            ("title", ValueKind::Text),
            ("content", ValueKind::Text),
            ("type", ValueKind::Text),
            ("key_points", ValueKind::List),
        ]),
        keywords: strings(&["guideline", "specification", "standard", "procedure", "design"]),
        ..CategoryRules::default()
    }
}

static BUILTIN: Lazy<HashMap<String, CategoryRules>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(GOVERNMENT_SCHEMES.to_string(), government_schemes());
    map.insert(WEATHER_DATA.to_string(), weather_data());
    map.insert(COST_INFORMATION.to_string(), cost_information());
    map.insert(TECHNICAL_RESOURCES.to_string(), technical_resources());
    map
});

static EMPTY: Lazy<CategoryRules> = Lazy::new(CategoryRules::default);

/// Look up the built-in rules for a category.
///
/// Unknown categories get the empty rule set.
pub fn rules_for(category: &str) -> &'static CategoryRules {
    BUILTIN.get(category).unwrap_or(&EMPTY)
}

/// Category → rules lookup, seeded from the built-in table.
///
/// Read-only once handed to a scorer, so it can be shared across threads.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    categories: HashMap<String, CategoryRules>,
}

impl RuleRegistry {
    /// Registry holding the four built-in categories.
    pub fn builtin() -> Self {
        Self {
            categories: (*BUILTIN).clone(),
        }
    }

    /// Registry with no categories at all.
    pub fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    /// Add or replace the rules for a category.
    pub fn register(&mut self, category: &str, rules: CategoryRules) -> Result<()> {
        rules.validate(category)?;
        self.categories.insert(category.to_string(), rules);
        Ok(())
    }

    pub fn rules_for(&self, category: &str) -> &CategoryRules {
        self.categories.get(category).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Registered category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
