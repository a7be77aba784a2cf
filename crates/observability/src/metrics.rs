//! 异步日志分发指标模块
//!
//! 基于 DispatchSnapshot 导出 Prometheus 指标，并在内存中聚合提交延迟。

use contracts::DispatchSnapshot;
use metrics::{counter, gauge, histogram};

/// 从 DispatchSnapshot 记录指标
///
/// 计数器按增量上报：传入上一次的快照，只累加两次之间的差值。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatch_snapshot;
///
/// let mut last = DispatchSnapshot::default();
/// loop {
///     let now = dispatcher.metrics();
///     record_dispatch_snapshot(&last, &now);
///     last = now;
/// }
/// ```
pub fn record_dispatch_snapshot(previous: &DispatchSnapshot, current: &DispatchSnapshot) {
    counter!("async_log_records_submitted_total")
        .increment(current.submitted.saturating_sub(previous.submitted));
    counter!("async_log_records_processed_total")
        .increment(current.processed.saturating_sub(previous.processed));
    counter!("async_log_records_failed_total")
        .increment(current.failed.saturating_sub(previous.failed));
    counter!("async_log_backpressure_events_total")
        .increment(current.backpressure_events.saturating_sub(previous.backpressure_events));

    gauge!("async_log_queue_depth").set(current.queue_len as f64);
    gauge!("async_log_queue_capacity").set(current.queue_capacity as f64);
    gauge!("async_log_records_in_flight").set(current.in_flight() as f64);
}

/// 记录一次 submit 调用耗时 (微秒)
pub fn record_submit_latency_us(latency_us: f64) {
    histogram!("async_log_submit_latency_us").record(latency_us);
}

/// 记录一次提交结果
pub fn record_submit_outcome(producer: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "async_log_submits_total",
        "producer" => producer.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 提交延迟聚合器
///
/// 每个生产者线程持有一个，结束后用 `merge` 合并。
#[derive(Debug, Clone, Default)]
pub struct SubmitStatsAggregator {
    /// 成功提交数
    pub accepted: u64,

    /// 被拒绝的提交数 (worker 失败或已关闭)
    pub rejected: u64,

    /// 提交延迟统计 (微秒)
    pub latency_us: RunningStats,
}

impl SubmitStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次成功提交
    pub fn record_accepted(&mut self, latency_us: f64) {
        self.accepted += 1;
        self.latency_us.push(latency_us);
    }

    /// 记录一次失败提交
    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }

    /// 合并另一个聚合器
    pub fn merge(&mut self, other: &Self) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.latency_us.merge(&other.latency_us);
    }

    /// 生成摘要
    pub fn summary(&self) -> SubmitSummary {
        let attempts = self.accepted + self.rejected;
        SubmitSummary {
            accepted: self.accepted,
            rejected: self.rejected,
            reject_rate: if attempts > 0 {
                self.rejected as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            latency_us: StatsSummary::from(&self.latency_us),
        }
    }
}

/// 提交摘要
#[derive(Debug, Clone, Default)]
pub struct SubmitSummary {
    pub accepted: u64,
    pub rejected: u64,
    pub reject_rate: f64,
    pub latency_us: StatsSummary,
}

impl std::fmt::Display for SubmitSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Submit Summary ===")?;
        writeln!(f, "Accepted: {}", self.accepted)?;
        writeln!(
            f,
            "Rejected: {} ({:.2}%)",
            self.rejected, self.reject_rate
        )?;
        writeln!(f, "Submit latency (us): {}", self.latency_us)
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
///
/// 支持合并 (Chan et al. 并行算法)，多线程各自统计后再汇总。
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    /// 合并另一组统计
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        let (n_a, n_b) = (self.count as f64, other.count as f64);

        self.mean += delta * n_b / total as f64;
        self.m2 += other.m2 + delta * delta * n_a * n_b / total as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = total;
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
