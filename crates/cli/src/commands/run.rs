//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::LoggerBlueprint;
use std::time::Duration;
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::{LoadConfig, LoadGenerator};

/// Execute the `run` command
pub async fn run_load(args: &RunArgs) -> Result<()> {
    let blueprint = resolve_blueprint(args)?;

    info!(
        queue_capacity = blueprint.dispatcher.queue_capacity,
        formatter = ?blueprint.formatter.kind,
        sinks = blueprint.sinks.len(),
        producers = args.producers,
        records = args.records,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint, args);
        return Ok(());
    }

    let load_config = LoadConfig {
        blueprint,
        producers: args.producers,
        records_per_producer: args.records,
        message_size: args.message_size,
        logger_name: args.logger_name.clone(),
        level: args.level,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    info!("Starting producers...");
    let stats = LoadGenerator::new(load_config)
        .run(shutdown_signal())
        .await
        .context("Load run failed")?;

    info!(
        submitted = stats.dispatch.submitted,
        processed = stats.dispatch.processed,
        failed = stats.dispatch.failed,
        duration_secs = stats.duration.as_secs_f64(),
        throughput = format!("{:.0}", stats.throughput()),
        "Load run completed"
    );
    stats.print_summary();

    if !stats.drained {
        anyhow::bail!("Dispatcher did not drain before the shutdown timeout");
    }
    Ok(())
}

/// Load the configuration (or defaults) and apply CLI overrides
fn resolve_blueprint(args: &RunArgs) -> Result<LoggerBlueprint> {
    let mut blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration given, using defaults");
            LoggerBlueprint::default()
        }
    };

    if let Some(capacity) = args.queue_capacity {
        info!(capacity, "Overriding queue capacity from CLI");
        blueprint.dispatcher.queue_capacity = capacity;
    }
    if let Some(timeout_ms) = args.shutdown_timeout_ms {
        info!(timeout_ms, "Overriding shutdown timeout from CLI");
        blueprint.dispatcher.shutdown_timeout_ms = Some(timeout_ms);
    }

    config_loader::ConfigLoader::validate(&blueprint).context("Invalid configuration")?;
    Ok(blueprint)
}

/// Resolves on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed that branch never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &LoggerBlueprint, args: &RunArgs) {
    println!("\n=== Configuration Summary ===\n");
    println!("Dispatcher:");
    println!("  Queue capacity: {}", blueprint.dispatcher.queue_capacity);
    println!("  Worker thread: {}", blueprint.dispatcher.worker_name);
    match blueprint.dispatcher.shutdown_timeout_ms {
        Some(ms) => println!("  Shutdown timeout: {} ms", ms),
        None => println!("  Shutdown timeout: unbounded"),
    }
    println!("  Formatter: {:?}", blueprint.formatter.kind);

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!("\nLoad:");
    println!("  Producers: {}", args.producers);
    println!("  Records per producer: {}", args.records);
    println!("  Message padding: {} bytes", args.message_size);
    println!("  Level: {}", args.level);

    println!();
}
