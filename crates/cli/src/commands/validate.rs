//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{LoggerBlueprint, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Queues smaller than this make producers block often
const SMALL_QUEUE_WARNING: usize = 64;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    queue_capacity: usize,
    formatter: String,
    sink_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    shutdown_timeout_ms: Option<u64>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    queue_capacity: blueprint.dispatcher.queue_capacity,
                    formatter: format!("{:?}", blueprint.formatter.kind),
                    sink_count: blueprint.sinks.len(),
                    shutdown_timeout_ms: blueprint.dispatcher.shutdown_timeout_ms,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &LoggerBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - records will be discarded".to_string());
    }

    if blueprint.dispatcher.queue_capacity < SMALL_QUEUE_WARNING {
        warnings.push(format!(
            "dispatcher.queue_capacity {} is small - producers will block frequently",
            blueprint.dispatcher.queue_capacity
        ));
    }

    if blueprint.dispatcher.shutdown_timeout_ms.is_none() {
        warnings.push(
            "dispatcher.shutdown_timeout_ms not set - shutdown waits for a stuck sink forever"
                .to_string(),
        );
    }

    for sink in &blueprint.sinks {
        if sink.sink_type == SinkType::Network && !sink.params.contains_key("format") {
            warnings.push(format!(
                "Network sink '{}' has no format - sending formatted text",
                sink.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!("  Formatter: {}", summary.formatter);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn args(file: &NamedTempFile) -> ValidateArgs {
        ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        }
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let file = config_file(
            r#"
[dispatcher]
queue_capacity = 8

[[sinks]]
name = "udp"
sink_type = "network"
[sinks.params]
addr = "127.0.0.1:9999"
"#,
        );

        let result = validate_config(&args(&file));
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("queue_capacity 8")));
        assert!(warnings.iter().any(|w| w.contains("'udp'")));
        assert_eq!(result.summary.unwrap().sink_count, 1);
    }

    #[test]
    fn test_invalid_config() {
        let file = config_file("[dispatcher]\nqueue_capacity = 0\n");
        let result = validate_config(&args(&file));
        assert!(!result.valid);
        assert!(result.error.is_some());
        assert!(run_validate(&args(&file)).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&ValidateArgs {
            config: "/nonexistent/logging.toml".into(),
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
