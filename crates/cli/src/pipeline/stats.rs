//! Load run statistics.

use std::time::Duration;

use contracts::DispatchSnapshot;
use observability::SubmitStatsAggregator;

/// Statistics from a load run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of producer threads
    pub producers: usize,

    /// Records each producer was asked to submit
    pub records_per_producer: u64,

    /// Total duration including the final drain
    pub duration: Duration,

    /// Producers were stopped by a signal or timeout
    pub interrupted: bool,

    /// The worker exited before the shutdown timeout
    pub drained: bool,

    /// Dispatcher counters after shutdown
    pub dispatch: DispatchSnapshot,

    /// Submit latency aggregated over all producers
    pub submits: SubmitStatsAggregator,
}

impl RunStats {
    /// Records processed per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatch.processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Failed records as a percentage of processed
    pub fn failure_rate(&self) -> f64 {
        if self.dispatch.processed > 0 {
            (self.dispatch.failed as f64 / self.dispatch.processed as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Load Run Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!(
            "   ├─ Producers: {} × {} records",
            self.producers, self.records_per_producer
        );
        println!("   ├─ Interrupted: {}", if self.interrupted { "yes" } else { "no" });
        println!("   ├─ Drained: {}", if self.drained { "yes" } else { "no" });
        println!("   └─ Throughput: {:.0} records/s", self.throughput());

        println!("\n📈 Dispatcher");
        println!("   ├─ Submitted: {}", self.dispatch.submitted);
        println!("   ├─ Processed: {}", self.dispatch.processed);
        println!(
            "   ├─ Failed: {} ({:.2}%)",
            self.dispatch.failed,
            self.failure_rate()
        );
        println!("   ├─ Backpressure events: {}", self.dispatch.backpressure_events);
        println!("   └─ Queue capacity: {}", self.dispatch.queue_capacity);

        let summary = self.submits.summary();
        println!("\n⏱️  Submit");
        println!("   ├─ Accepted: {}", summary.accepted);
        println!(
            "   ├─ Rejected: {} ({:.2}%)",
            summary.rejected, summary.reject_rate
        );
        println!("   └─ Latency (us): {}", summary.latency_us);

        println!();
    }
}
