//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::LoggerBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    dispatcher: DispatcherInfo,
    formatter: String,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct DispatcherInfo {
    queue_capacity: usize,
    worker_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    shutdown_timeout_ms: Option<u64>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &LoggerBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: format!("{:?}", s.sink_type),
            // Sorted so output is stable
            params: if args.sinks {
                s.params.clone().into_iter().collect()
            } else {
                BTreeMap::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        dispatcher: DispatcherInfo {
            queue_capacity: blueprint.dispatcher.queue_capacity,
            worker_name: blueprint.dispatcher.worker_name.clone(),
            shutdown_timeout_ms: blueprint.dispatcher.shutdown_timeout_ms,
        },
        formatter: format!("{:?}", blueprint.formatter.kind),
        sinks,
    }
}

fn print_config_info(blueprint: &LoggerBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Async Logger Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let dispatcher = &blueprint.dispatcher;
    println!("⚙️  Dispatcher");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Queue capacity: {}", dispatcher.queue_capacity);
    println!("   ├─ Worker thread: {}", dispatcher.worker_name);
    match dispatcher.shutdown_timeout_ms {
        Some(ms) => println!("   └─ Shutdown timeout: {} ms", ms),
        None => println!("   └─ Shutdown timeout: unbounded"),
    }

    println!("\n📝 Formatter: {:?}", blueprint.formatter.kind);

    println!("\n📤 Sinks ({})", blueprint.sinks.len());
    for (i, sink) in blueprint.sinks.iter().enumerate() {
        let is_last = i == blueprint.sinks.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);

        if args.sinks && !sink.params.is_empty() {
            let params: BTreeMap<_, _> = sink.params.iter().collect();
            for (j, (key, value)) in params.iter().enumerate() {
                let param_prefix = if j == params.len() - 1 { "└─" } else { "├─" };
                println!("   {}  {} {} = {}", child_prefix, param_prefix, key, value);
            }
        }
    }

    println!();
}
