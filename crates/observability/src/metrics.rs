//! Batching metrics
//!
//! Metric descriptions for the Prometheus endpoint and an in-memory
//! aggregator that summarizes batch plans across sessions.

use std::collections::BTreeMap;
use std::fmt;

use batcher::{session_span, BatchPlan};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram, Unit};

/// Register descriptions for every metric the pipeline emits
pub fn describe_metrics() {
    describe_counter!(
        "motion_batcher_batches_total",
        "Batches produced, by strategy"
    );
    describe_histogram!(
        "motion_batcher_batch_entries",
        Unit::Count,
        "Samples per batch (both sensors)"
    );
    describe_histogram!(
        "motion_batcher_batch_span_seconds",
        Unit::Seconds,
        "Time covered by a single batch"
    );
    describe_gauge!(
        "motion_batcher_estimated_rate_hz",
        "Sampling rate estimated from timestamps, by sensor"
    );
    describe_counter!(
        "motion_batcher_gyro_dropped_total",
        "Gyroscope samples left over by count batching"
    );
    describe_counter!(
        "motion_capture_samples_total",
        "Samples received by capture collectors, by sensor"
    );
    describe_counter!(
        "motion_capture_out_of_order_total",
        "Samples that arrived with an earlier timestamp than their predecessor"
    );
    describe_counter!(
        "motion_dispatch_records_total",
        "Records handled by sink workers, by sink, kind and status"
    );
    describe_counter!(
        "motion_pipeline_sessions_total",
        "Sessions queued for persistence"
    );
    describe_histogram!(
        "motion_pipeline_stage_ms",
        Unit::Milliseconds,
        "Wall time of pipeline stages"
    );
}

/// Count one persisted session
pub fn record_session_persisted(batches: usize) {
    counter!("motion_pipeline_sessions_total").increment(1);
    histogram!("motion_pipeline_session_batches").record(batches as f64);
}

/// Record the wall time of a pipeline stage (capture, batch, persist)
pub fn record_pipeline_stage_ms(stage: &'static str, elapsed_ms: f64) {
    histogram!("motion_pipeline_stage_ms", "stage" => stage).record(elapsed_ms);
}

/// Written/failed record counts for one sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkTotals {
    pub written: u64,
    pub failed: u64,
}

/// Aggregates batch plans in memory for end-of-run reporting.
#[derive(Debug, Clone, Default)]
pub struct BatchMetricsAggregator {
    pub sessions: u64,
    pub batches: u64,
    pub accelerometer_entries: u64,
    pub gyroscope_entries: u64,
    /// Entries per batch
    pub entry_stats: RunningStats,
    /// Seconds covered per batch
    pub span_stats: RunningStats,
    pub batches_by_strategy: BTreeMap<String, u64>,
    pub sinks: BTreeMap<String, SinkTotals>,
}

impl BatchMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one session's plan into the totals
    pub fn update(&mut self, plan: &BatchPlan) {
        let summary = &plan.summary;
        self.sessions += 1;
        self.batches += plan.batches.len() as u64;
        self.accelerometer_entries += summary.accelerometer_entries as u64;
        self.gyroscope_entries += summary.gyroscope_entries as u64;
        *self
            .batches_by_strategy
            .entry(summary.strategy.to_string())
            .or_insert(0) += plan.batches.len() as u64;

        for batch in &plan.batches {
            self.entry_stats.push(batch.len() as f64);
            if let Some(width) = session_span(&batch.data).duration() {
                self.span_stats.push(width);
            }
        }
    }

    /// Add record counts reported by a sink after shutdown
    pub fn record_sink(&mut self, name: &str, written: u64, failed: u64) {
        let totals = self.sinks.entry(name.to_string()).or_default();
        totals.written += written;
        totals.failed += failed;
    }

    pub fn summary(&self) -> BatchMetricsSummary {
        BatchMetricsSummary {
            sessions: self.sessions,
            batches: self.batches,
            accelerometer_entries: self.accelerometer_entries,
            gyroscope_entries: self.gyroscope_entries,
            entries_per_batch: StatsSummary::from(&self.entry_stats),
            batch_span_s: StatsSummary::from(&self.span_stats),
            batches_by_strategy: self.batches_by_strategy.clone(),
            sinks: self.sinks.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Snapshot of [`BatchMetricsAggregator`]
#[derive(Debug, Clone, Default)]
pub struct BatchMetricsSummary {
    pub sessions: u64,
    pub batches: u64,
    pub accelerometer_entries: u64,
    pub gyroscope_entries: u64,
    pub entries_per_batch: StatsSummary,
    pub batch_span_s: StatsSummary,
    pub batches_by_strategy: BTreeMap<String, u64>,
    pub sinks: BTreeMap<String, SinkTotals>,
}

impl BatchMetricsSummary {
    /// Share of written records that failed, in percent
    pub fn failure_rate(&self) -> f64 {
        let (written, failed) = self
            .sinks
            .values()
            .fold((0, 0), |(w, f), t| (w + t.written, f + t.failed));
        let total = written + failed;
        if total > 0 {
            failed as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for BatchMetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Batch Metrics Summary ===")?;
        writeln!(f, "Sessions: {}", self.sessions)?;
        writeln!(f, "Batches: {}", self.batches)?;
        writeln!(
            f,
            "Entries: accelerometer {}, gyroscope {}",
            self.accelerometer_entries, self.gyroscope_entries
        )?;
        writeln!(f, "Entries per batch: {}", self.entries_per_batch)?;
        writeln!(f, "Batch span (s): {}", self.batch_span_s)?;
        for (strategy, count) in &self.batches_by_strategy {
            writeln!(f, "  {strategy}: {count} batches")?;
        }
        if !self.sinks.is_empty() {
            writeln!(f, "Sinks ({:.2}% failed):", self.failure_rate())?;
            for (name, totals) in &self.sinks {
                writeln!(
                    f,
                    "  {}: {} written, {} failed",
                    name, totals.written, totals.failed
                )?;
            }
        }
        Ok(())
    }
}

/// Statistics summary
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

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
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
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
