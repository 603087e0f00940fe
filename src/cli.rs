//! Command-line interface for jalsetu.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::batch::{self, MinQuality};
use crate::config::{self, QualityConfig};
use crate::dataset;
use crate::report::{self, ValidationReport};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["jalsetu.yaml", ".jalsetu.yaml", "quality.yaml"];

/// Data-quality gate for scraped rainwater-harvesting records.
///
/// Scores every record for completeness, accuracy, freshness, relevance
/// and structure, keeps the ones that clear the category threshold, and
/// reports what was wrong with the rest.
#[derive(Parser)]
#[command(name = "jalsetu")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score scraped records and report their quality
    #[command(visible_alias = "check")]
    Validate(ValidateArgs),
    /// List known categories and their rules
    Categories(CategoriesArgs),
    /// Create a new quality config from a template
    Init(InitArgs),
}

/// Arguments for the validate command.
#[derive(Parser)]
pub struct ValidateArgs {
    /// JSON file or directory of JSON files
    pub path: PathBuf,

    /// Category for array files (default: file stem)
    #[arg(long)]
    pub category: Option<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the acceptance threshold for every category
    #[arg(short, long)]
    pub min_quality: Option<f64>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Write accepted records to this JSON file
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Score records on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Keep duplicate records
    #[arg(long)]
    pub no_dedupe: bool,
}

/// Arguments for the categories command.
#[derive(Parser)]
pub struct CategoriesArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "jalsetu.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Standard thresholds and weights for the four built-in categories",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "strict",
        description: "Higher thresholds, tighter freshness, extra category example",
        content: include_str!("templates/strict.yaml"),
    },
];

/// Discover a config file in the current directory.
fn discover_config() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Load the explicit or discovered config, or the built-in defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(QualityConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config(),
    };

    let config = match &path {
        Some(p) => {
            info!(path = %p.display(), "using config");
            QualityConfig::parse_file(p)?
        }
        None => {
            info!("no config file found, using built-in defaults");
            QualityConfig::default()
        }
    };

    config::validate(&config)?;
    Ok((config, path))
}

/// Run the validate command.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let override_threshold = match args.min_quality.map(MinQuality::new).transpose() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: invalid --min-quality: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let (config, config_path) = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid config: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let validator = config.validator()?;

    let sets = match dataset::load_path(&args.path, args.category.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if sets.is_empty() {
        warn!("no records to validate");
    }

    let mut reports: Vec<ValidationReport> = Vec::with_capacity(sets.len());
    let mut accepted = Vec::with_capacity(sets.len());

    for set in sets {
        let records = if args.no_dedupe {
            set.records
        } else {
            batch::dedupe(set.records)
        };

        if !validator.scorer().registry().contains(&set.category) {
            warn!(
                category = %set.category,
                "unknown category, no field rules apply"
            );
        }

        let threshold = match override_threshold {
            Some(t) => t,
            None => config.threshold_for(&set.category)?,
        };

        let result = if args.parallel {
            validator.validate_batch_parallel(&records, &set.category, threshold)
        } else {
            validator.validate_batch(&records, &set.category, threshold)
        };

        reports.push(report::generate_report(&result));
        accepted.push((result.category, result.valid));
    }

    if let Some(export) = &args.export {
        dataset::export_records(export, &accepted)?;
    }

    // Output results
    let config_str = config_path.map(|p| p.to_string_lossy().to_string());
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&path_str, config_str.as_deref(), &reports)?,
        _ => report::write_pretty(&path_str, config_str.as_deref(), &reports),
    }

    // Return appropriate exit code
    if reports.iter().all(|r| r.passed) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the categories command.
pub fn run_categories(args: &CategoriesArgs) -> anyhow::Result<i32> {
    let (config, _) = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid config: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let registry = config.registry()?;

    for category in registry.categories() {
        let rules = registry.rules_for(category);
        let threshold = config.threshold_for(category)?;

        println!(
            "{}  {}",
            category.cyan().bold(),
            format!("(min quality {:.2})", threshold.value()).dimmed()
        );
        println!("  required: {}", list_or_dash(&rules.required_fields));
        println!("  optional: {}", list_or_dash(&rules.optional_fields));
        for (field, kind) in &rules.format_patterns {
            println!("  pattern:  {} must be {}", field, kind);
        }
        for (field, (min, max)) in &rules.numeric_ranges {
            println!("  range:    {} in [{}, {}]", field, min, max);
        }
        for (field, bounds) in &rules.length_bounds {
            println!("  length:   {} {}", field, bounds);
        }
        for (field, allowed) in &rules.allowed_values {
            println!("  values:   {} one of {}", field, allowed.join(", "));
        }
        if !rules.keywords.is_empty() {
            println!("  keywords: {}", rules.keywords.join(", "));
        }
        println!();
    }

    Ok(EXIT_SUCCESS)
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Parse a bundled template and check it the same way a user config is checked.
fn load_template(template: &Template) -> anyhow::Result<QualityConfig> {
    let config: QualityConfig = serde_yaml::from_str(template.content)
        .with_context(|| format!("template '{}' does not parse", template.name))?;
    config::validate(&config)
        .with_context(|| format!("template '{}' is invalid", template.name))?;
    Ok(config)
}

fn threshold_summary(config: &QualityConfig) -> String {
    let mut parts: Vec<String> = config
        .thresholds
        .iter()
        .map(|(category, t)| format!("{} {:.2}", category, t))
        .collect();
    parts.push(format!("others {:.2}", config.min_quality));
    parts.join(", ")
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let Some(template) = TEMPLATES.iter().find(|t| t.name == args.template) else {
        eprintln!("Error: unknown template {:?}", args.template);
        eprintln!("Run 'jalsetu init --list' to see available templates");
        return Ok(EXIT_ERROR);
    };

    // Never hand out a config that validate would reject.
    let config = match load_template(template) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }
    info!(path = %args.output.display(), template = template.name, "wrote config");

    let registry = config.registry()?;
    let categories: Vec<String> = registry.categories().into_iter().map(str::to_string).collect();

    println!(
        "Created {} from template '{}'",
        args.output.display().to_string().bold(),
        template.name
    );
    println!("  categories: {}", list_or_dash(&categories));
    println!("  thresholds: {}", threshold_summary(&config));
    println!();
    println!(
        "Check it with: jalsetu categories --config {}",
        args.output.display()
    );
    println!(
        "Then run:      jalsetu validate records.json --config {}",
        args.output.display()
    );

    Ok(EXIT_SUCCESS)
}

/// List bundled templates with the thresholds each one sets.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let config = load_template(template)?;
        let marker = if template.name == "default" { " (default)" } else { "" };
        println!("  {}{}", template.name.cyan().bold(), marker);
        println!("    {}", template.description);
        println!("    {}", format!("thresholds: {}", threshold_summary(&config)).dimmed());
        if !config.categories.is_empty() {
            let extra: Vec<String> = config.categories.keys().cloned().collect();
            println!("    {}", format!("adds: {}", extra.join(", ")).dimmed());
        }
    }

    println!();
    println!("Usage:");
    println!("  jalsetu init --template <name>");

    Ok(EXIT_SUCCESS)
}
