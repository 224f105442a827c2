//! MotionBatcher: configured rate estimation and strategy dispatch.

use std::fmt;

use contracts::{BatchStrategy, BatcherConfig, MotionBatch, MotionSeries, SensorKind, SessionSpan};
use tracing::{debug, info, instrument, warn};

use crate::count::batch_by_count;
use crate::error::Result;
use crate::rate::{estimate_rate, rate_to_hz};
use crate::span::session_span;
use crate::window::{batch_by_time_interval, batch_time_interval};

/// Where a sensor's rate came from after [`MotionBatcher::estimate_rates`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    /// Estimated from captured timestamps
    Estimated,
    /// Estimate unusable; the series already carried a rate
    Existing,
    /// Estimate unusable; the configured default was applied
    Fallback,
    /// No rate available
    Unset,
}

/// Outcome of estimating one sensor's rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    /// Raw estimate (Hz), possibly infinite
    pub estimate: Option<f64>,
    /// Rate now stored on the series
    pub rate: Option<u32>,
    pub source: RateSource,
}

/// Rate estimation result for both sensors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimates {
    pub accelerometer: RateEstimate,
    pub gyroscope: RateEstimate,
}

impl RateEstimates {
    pub fn get(&self, kind: SensorKind) -> &RateEstimate {
        match kind {
            SensorKind::Accelerometer => &self.accelerometer,
            SensorKind::Gyroscope => &self.gyroscope,
        }
    }
}

/// Summary statistics of a batch plan
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub strategy: BatchStrategy,
    pub target_entries_per_batch: usize,
    pub batch_count: usize,
    pub accelerometer_entries: usize,
    pub gyroscope_entries: usize,
    pub min_entries: usize,
    pub max_entries: usize,
    pub mean_entries: f64,
    /// Window length, time-interval strategy only (seconds)
    pub interval_s: Option<f64>,
    pub span: SessionSpan,
}

impl BatchSummary {
    fn from_batches(
        strategy: BatchStrategy,
        target_entries_per_batch: usize,
        interval_s: Option<f64>,
        span: SessionSpan,
        batches: &[MotionBatch],
    ) -> Self {
        let sizes = batches.iter().map(MotionBatch::len);
        let total: usize = sizes.clone().sum();
        Self {
            strategy,
            target_entries_per_batch,
            batch_count: batches.len(),
            accelerometer_entries: batches.iter().map(|b| b.data.accelerometer.len()).sum(),
            gyroscope_entries: batches.iter().map(|b| b.data.gyroscope.len()).sum(),
            min_entries: sizes.clone().min().unwrap_or(0),
            max_entries: sizes.max().unwrap_or(0),
            mean_entries: if batches.is_empty() {
                0.0
            } else {
                total as f64 / batches.len() as f64
            },
            interval_s,
            span,
        }
    }

    pub fn total_entries(&self) -> usize {
        self.accelerometer_entries + self.gyroscope_entries
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "strategy:        {}", self.strategy)?;
        writeln!(f, "target/batch:    {}", self.target_entries_per_batch)?;
        if let Some(interval) = self.interval_s {
            writeln!(f, "window:          {:.3}s", interval)?;
        }
        writeln!(f, "batches:         {}", self.batch_count)?;
        writeln!(
            f,
            "entries:         {} (accelerometer {}, gyroscope {})",
            self.total_entries(),
            self.accelerometer_entries,
            self.gyroscope_entries
        )?;
        writeln!(
            f,
            "entries/batch:   min {} / mean {:.1} / max {}",
            self.min_entries, self.mean_entries, self.max_entries
        )?;
        match (self.span.start, self.span.end) {
            (Some(start), Some(end)) => write!(f, "span:            {start:.3} .. {end:.3}"),
            _ => write!(f, "span:            -"),
        }
    }
}

/// Batches produced for one series
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    pub batches: Vec<MotionBatch>,
    pub summary: BatchSummary,
}

/// Configured batcher
#[derive(Debug, Clone, Default)]
pub struct MotionBatcher {
    config: BatcherConfig,
}

impl MotionBatcher {
    pub fn new(config: BatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    fn default_rate(&self, kind: SensorKind) -> u32 {
        match kind {
            SensorKind::Accelerometer => self.config.default_accelerometer_rate,
            SensorKind::Gyroscope => self.config.default_gyroscope_rate,
        }
    }

    /// Estimate both capture rates and store them on the series.
    ///
    /// A usable estimate overwrites the stored rate. Otherwise the stored
    /// rate is kept, and if there is none the configured default is applied
    /// when `fallback_rates` is enabled.
    #[instrument(name = "estimate_rates", skip(self, series))]
    pub fn estimate_rates(&self, series: &mut MotionSeries) -> RateEstimates {
        let [accelerometer, gyroscope] = SensorKind::ALL.map(|kind| self.estimate_one(series, kind));
        RateEstimates {
            accelerometer,
            gyroscope,
        }
    }

    fn estimate_one(&self, series: &mut MotionSeries, kind: SensorKind) -> RateEstimate {
        let estimate = estimate_rate(&series.timestamps(kind));
        let (rate, source) = match (estimate.and_then(rate_to_hz), series.rate(kind)) {
            (Some(hz), _) => (Some(hz), RateSource::Estimated),
            (None, Some(existing)) => (Some(existing), RateSource::Existing),
            (None, None) if self.config.fallback_rates => {
                (Some(self.default_rate(kind)), RateSource::Fallback)
            }
            (None, None) => (None, RateSource::Unset),
        };

        if estimate.is_some_and(|e| !e.is_finite()) {
            warn!(sensor = %kind, "degenerate rate estimate (identical timestamps)");
        }
        match source {
            RateSource::Fallback => {
                warn!(sensor = %kind, rate = ?rate, "rate not estimable, using default")
            }
            _ => debug!(sensor = %kind, estimate = ?estimate, rate = ?rate, ?source, "rate"),
        }
        if let Some(hz) = rate {
            metrics::gauge!("motion_batcher_estimated_rate_hz", "sensor" => kind.as_str())
                .set(hz as f64);
        }

        series.set_rate(kind, rate);
        RateEstimate {
            estimate,
            rate,
            source,
        }
    }

    /// Run the configured strategy over a series.
    #[instrument(
        name = "motion_batcher_batch",
        skip(self, series),
        fields(strategy = %self.config.strategy, entries = series.len())
    )]
    pub fn batch(&self, series: &MotionSeries) -> Result<BatchPlan> {
        let target = self.config.target_entries_per_batch;
        let strategy = self.config.strategy;

        let (batches, interval_s) = match strategy {
            BatchStrategy::Count => (batch_by_count(series, target)?, None),
            BatchStrategy::TimeInterval => {
                let batches = batch_by_time_interval(series, target)?;
                let interval = if batches.is_empty() {
                    None
                } else {
                    Some(batch_time_interval(series, target)?)
                };
                (batches, interval)
            }
        };

        let summary =
            BatchSummary::from_batches(strategy, target, interval_s, session_span(series), &batches);
        record_plan_metrics(strategy, &batches);

        info!(
            batches = summary.batch_count,
            accelerometer = summary.accelerometer_entries,
            gyroscope = summary.gyroscope_entries,
            "series batched"
        );

        Ok(BatchPlan { batches, summary })
    }
}

fn record_plan_metrics(strategy: BatchStrategy, batches: &[MotionBatch]) {
    metrics::counter!("motion_batcher_batches_total", "strategy" => strategy.as_str())
        .increment(batches.len() as u64);
    for batch in batches {
        metrics::histogram!("motion_batcher_batch_entries").record(batch.len() as f64);
        if let Some(width) = session_span(&batch.data).duration() {
            metrics::histogram!("motion_batcher_batch_span_seconds").record(width);
        }
    }
}
