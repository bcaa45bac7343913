//! Lexi - Entry Validation CLI
//!
//! Binary facade over `lexi-validate`. Reads dictionary entries from JSON
//! files, validates them and prints a report.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lexi validate FILE...` | Validate entries; exits non-zero on critical findings |
//! | `lexi rules` | List the loaded rule set |

mod input;

use clap::{Parser, Subcommand, ValueEnum};
use lexi_validate::logging::init_logging;
use lexi_validate::{
    ConfigLoader, EngineConfig, Priority, Reporter, RuleRepository, ValidationEngine,
    ValidationMode, ValidationResult,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Command line interface for Lexi
#[derive(Parser, Debug)]
#[command(name = "lexi")]
#[command(about = "Lexi - Dictionary Entry Validation")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Rule document or directory (overrides configuration)
    #[arg(short, long, global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate entries held in JSON files
    Validate {
        /// Validation pass mode
        #[arg(short, long, default_value = "save")]
        mode: ValidationMode,

        /// Only apply client-visible rules
        #[arg(long)]
        client_only: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Hide findings below this priority
        #[arg(long, value_parser = parse_priority, default_value = "informational")]
        min_priority: Priority,

        /// Files holding one entry or an array of entries
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the loaded rules
    Rules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    match s.to_ascii_lowercase().as_str() {
        "critical" | "error" => Ok(Priority::Critical),
        "warning" | "warn" => Ok(Priority::Warning),
        "informational" | "info" => Ok(Priority::Informational),
        other => Err(format!(
            "invalid priority '{other}' (expected critical, warning or informational)"
        )),
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load()?;
    if let Some(rules) = &cli.rules {
        config.rules_path = Some(rules.clone());
    }
    Ok(config)
}

fn read_all(files: &[PathBuf]) -> Result<Vec<serde_json::Value>, input::RecordSourceError> {
    let mut records = Vec::new();
    for file in files {
        records.extend(input::read_records(file)?);
    }
    Ok(records)
}

fn validate(
    config: &EngineConfig,
    mode: ValidationMode,
    client_only: bool,
    format: OutputFormat,
    min_priority: Priority,
    files: &[PathBuf],
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let records = read_all(files)?;
    let engine = ValidationEngine::from_config(config)?
        .with_client_visible_only(config.client_visible_only || client_only);
    info!(records = records.len(), mode = %mode, "Validating entries");

    let results = engine.validate_record_set(&records, mode);
    let failed = results.values().any(ValidationResult::has_critical_errors);

    let shown: BTreeMap<String, ValidationResult> = results
        .into_iter()
        .map(|(key, result)| {
            let kept = ValidationResult::aggregate(result.at_or_above(min_priority).cloned());
            (key, kept)
        })
        .collect();

    match format {
        OutputFormat::Text => print!("{}", Reporter::set_to_human_readable(&shown, mode)),
        OutputFormat::Json => {
            let reports: Vec<_> = shown
                .into_iter()
                .map(|(key, result)| Reporter::report(key, mode, result))
                .collect();
            println!("{}", Reporter::set_to_json(&reports));
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn list_rules(rules_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let repository = match rules_path {
        Some(path) => RuleRepository::load(path)?,
        None => RuleRepository::builtin()?,
    };
    println!("{} rules from {}", repository.len(), repository.source());
    for (id, rule) in repository.all() {
        let state = if rule.enabled { "" } else { " (disabled)" };
        println!(
            "  {id:<10} {:<8} {:<16} {:<6} {}{state}",
            rule.priority.to_string(),
            rule.category.to_string(),
            rule.applicability_mode.to_string(),
            rule.name
        );
    }
    Ok(())
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Validate {
            mode,
            client_only,
            format,
            min_priority,
            files,
        } => validate(&config, mode, client_only, format, min_priority, &files),
        Command::Rules => {
            list_rules(config.rules_path.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
