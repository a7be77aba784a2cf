//! Load generator - drives the dispatcher from several producer threads.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{DispatchSnapshot, Level, LogRecord, LoggerBlueprint};
use dispatcher::AsyncDispatcher;
use observability::{
    record_dispatch_snapshot, record_submit_latency_us, record_submit_outcome,
    SubmitStatsAggregator,
};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::RunStats;

/// How often dispatcher counters are exported while running
const METRICS_INTERVAL: Duration = Duration::from_secs(1);

/// Load run configuration
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Dispatcher, formatter and sinks
    pub blueprint: LoggerBlueprint,

    /// Number of producer threads
    pub producers: usize,

    /// Records submitted by each producer
    pub records_per_producer: u64,

    /// Padding appended to each message
    pub message_size: usize,

    /// Logger name prefix
    pub logger_name: String,

    /// Severity of generated records
    pub level: Level,

    /// Stop producing after this long (None = run to completion)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// What one producer thread submits
#[derive(Debug, Clone)]
struct ProducerPlan {
    id: usize,
    records: u64,
    logger_name: String,
    level: Level,
    padding: String,
}

/// Runs producers against a dispatcher and collects statistics
pub struct LoadGenerator {
    config: LoadConfig,
}

impl LoadGenerator {
    /// Create a new generator with the given configuration
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Run until every producer finishes, the timeout elapses or
    /// `shutdown` resolves; then drain the dispatcher.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let start_time = Instant::now();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        if self.config.blueprint.sinks.is_empty() {
            warn!("No sinks configured - records will be formatted and discarded");
        }

        let dispatcher = Arc::new(
            dispatcher::create_dispatcher(&self.config.blueprint)
                .context("Failed to create dispatcher")?,
        );
        info!(
            capacity = dispatcher.capacity(),
            sinks = self.config.blueprint.sinks.len(),
            "Dispatcher started"
        );

        let (reporter_stop, reporter) = spawn_reporter(Arc::clone(&dispatcher));

        let stop = Arc::new(AtomicBool::new(false));
        let mut producers = JoinSet::new();
        for id in 0..self.config.producers {
            let plan = self.plan_for(id);
            let dispatcher = Arc::clone(&dispatcher);
            let stop = Arc::clone(&stop);
            producers.spawn_blocking(move || produce(&plan, &dispatcher, &stop));
        }
        info!(producers = self.config.producers, "Producers running");

        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(shutdown);
        tokio::pin!(deadline);

        let mut submits = SubmitStatsAggregator::new();
        let mut interrupted = false;
        loop {
            tokio::select! {
                joined = producers.join_next() => match joined {
                    Some(Ok(stats)) => submits.merge(&stats),
                    Some(Err(e)) => warn!(error = %e, "Producer task failed"),
                    None => break,
                },
                _ = &mut shutdown, if !interrupted => {
                    warn!("Received shutdown signal, stopping producers...");
                    interrupted = true;
                    stop.store(true, Ordering::Relaxed);
                }
                _ = &mut deadline, if !interrupted => {
                    warn!("Run timed out, stopping producers...");
                    interrupted = true;
                    stop.store(true, Ordering::Relaxed);
                }
            }
        }

        // Producers are gone; export what the reporter last saw
        let _ = reporter_stop.send(());
        let last_reported = reporter.await.unwrap_or_default();

        info!("Shutting down dispatcher...");
        let shutdown_timeout = self.config.blueprint.dispatcher.shutdown_timeout();
        let (drained, dispatch) =
            tokio::task::spawn_blocking(move || shutdown_dispatcher(dispatcher, shutdown_timeout))
                .await
                .context("Dispatcher shutdown task failed")?;

        record_dispatch_snapshot(&last_reported, &dispatch);

        let stats = RunStats {
            producers: self.config.producers,
            records_per_producer: self.config.records_per_producer,
            duration: start_time.elapsed(),
            interrupted,
            drained,
            dispatch,
            submits,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            throughput = format!("{:.0}", stats.throughput()),
            "Load run shutdown complete"
        );

        Ok(stats)
    }

    fn plan_for(&self, id: usize) -> ProducerPlan {
        ProducerPlan {
            id,
            records: self.config.records_per_producer,
            logger_name: format!("{}-{}", self.config.logger_name, id),
            level: self.config.level,
            padding: "x".repeat(self.config.message_size),
        }
    }
}

/// Submit every planned record unless `stop` is raised
fn produce(plan: &ProducerPlan, dispatcher: &AsyncDispatcher, stop: &AtomicBool) -> SubmitStatsAggregator {
    let label = format!("producer-{}", plan.id);
    let mut stats = SubmitStatsAggregator::new();

    for seq in 0..plan.records {
        if stop.load(Ordering::Relaxed) {
            debug!(producer = plan.id, seq, "Producer stopped early");
            break;
        }

        let record = LogRecord::new(
            plan.logger_name.as_str(),
            plan.level,
            format!("seq={} {}", seq, plan.padding),
        );

        let started = Instant::now();
        match dispatcher.submit(&record) {
            Ok(()) => {
                let latency_us = started.elapsed().as_secs_f64() * 1_000_000.0;
                stats.record_accepted(latency_us);
                record_submit_latency_us(latency_us);
                record_submit_outcome(&label, true);
            }
            Err(e) if e.is_worker_failure() => {
                // The record was not queued; the dispatcher keeps running
                warn!(producer = plan.id, seq, error = %e, "Sink failure reported");
                stats.record_rejected();
                record_submit_outcome(&label, false);
            }
            Err(e) => {
                warn!(producer = plan.id, seq, error = %e, "Dispatcher stopped accepting records");
                stats.record_rejected();
                record_submit_outcome(&label, false);
                break;
            }
        }
    }

    stats
}

/// Periodically export dispatcher counters; returns the last snapshot exported
fn spawn_reporter(
    dispatcher: Arc<AsyncDispatcher>,
) -> (oneshot::Sender<()>, tokio::task::JoinHandle<DispatchSnapshot>) {
    let (stop_tx, mut stop_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let mut last = DispatchSnapshot::default();
        let mut ticker = tokio::time::interval(METRICS_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let current = dispatcher.metrics();
                    record_dispatch_snapshot(&last, &current);
                    debug!(
                        queue_len = current.queue_len,
                        processed = current.processed,
                        "Dispatcher progress"
                    );
                    last = current;
                }
                _ = &mut stop_rx => break,
            }
        }
        last
    });
    (stop_tx, handle)
}

/// Blocking: stop the dispatcher and report whether it drained in time
fn shutdown_dispatcher(
    dispatcher: Arc<AsyncDispatcher>,
    timeout: Option<Duration>,
) -> (bool, DispatchSnapshot) {
    let drained = match timeout {
        Some(timeout) => dispatcher.shutdown_timeout(timeout),
        None => {
            dispatcher.shutdown();
            true
        }
    };
    let snapshot = dispatcher.metrics();

    if !drained {
        warn!(
            in_flight = snapshot.in_flight(),
            "Dispatcher still draining after timeout, abandoning worker"
        );
        // Dropping would join the stuck worker
        std::mem::forget(dispatcher);
    }

    (drained, snapshot)
}
