//! Pipeline statistics and reporting.

use std::path::PathBuf;
use std::time::Duration;

use batcher::{BatchSummary, RateEstimates, RateSource};
use capture::CaptureSnapshot;
use dispatcher::SinkReport;
use observability::BatchMetricsAggregator;
use serde::Serialize;

/// Statistics from one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub session_id: String,

    /// Wall time from batching start to sink shutdown
    pub duration: Duration,

    /// Collector counts, simulate runs only
    pub capture: Option<CaptureSnapshot>,

    /// Rate estimation outcome, when estimation ran
    pub rates: Option<RateEstimates>,

    /// Rates used for batching
    pub accelerometer_rate: Option<u32>,
    pub gyroscope_rate: Option<u32>,

    pub summary: BatchSummary,

    pub sinks: Vec<SinkReport>,

    /// Dry runs: whether the stored batches reassemble into the input
    pub verified: Option<bool>,

    /// Directory file sinks wrote to
    pub output: Option<PathBuf>,

    pub metrics: BatchMetricsAggregator,
}

impl PipelineStats {
    /// Entries batched per second of wall time
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.summary.total_entries() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Records the sinks failed to write
    pub fn failures(&self) -> u64 {
        self.sinks.iter().map(|s| s.metrics.failure_count).sum()
    }

    pub fn report(&self) -> PipelineReport {
        PipelineReport {
            session_id: self.session_id.clone(),
            duration_ms: self.duration.as_secs_f64() * 1000.0,
            strategy: self.summary.strategy.to_string(),
            target_entries_per_batch: self.summary.target_entries_per_batch,
            interval_s: self.summary.interval_s,
            batches: self.summary.batch_count,
            accelerometer_entries: self.summary.accelerometer_entries,
            gyroscope_entries: self.summary.gyroscope_entries,
            min_entries: self.summary.min_entries,
            max_entries: self.summary.max_entries,
            mean_entries: self.summary.mean_entries,
            span_start: self.summary.span.start,
            span_end: self.summary.span.end,
            accelerometer_rate: self.accelerometer_rate,
            gyroscope_rate: self.gyroscope_rate,
            rate_sources: self.rates.map(|r| RateSourceReport {
                accelerometer: source_name(r.accelerometer.source),
                gyroscope: source_name(r.gyroscope.source),
            }),
            capture: self.capture.map(|c| CaptureReport {
                accelerometer: c.accelerometer_received,
                gyroscope: c.gyroscope_received,
                out_of_order: c.out_of_order,
            }),
            sinks: self
                .sinks
                .iter()
                .map(|s| SinkSummary {
                    name: s.name.clone(),
                    sessions_written: s.metrics.sessions_written,
                    batches_written: s.metrics.batches_written,
                    failures: s.metrics.failure_count,
                })
                .collect(),
            verified: self.verified,
            output: self.output.as_ref().map(|p| p.display().to_string()),
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Batching Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Session: {}", self.session_id);
        println!("   ├─ Duration: {:.3}s", self.duration.as_secs_f64());
        println!("   ├─ Throughput: {:.0} entries/s", self.throughput());
        println!(
            "   └─ Rates: accelerometer {} Hz, gyroscope {} Hz",
            rate_text(self.accelerometer_rate),
            rate_text(self.gyroscope_rate)
        );

        if let Some(capture) = self.capture {
            println!("\n📡 Capture");
            println!("   ├─ Accelerometer samples: {}", capture.accelerometer_received);
            println!("   ├─ Gyroscope samples: {}", capture.gyroscope_received);
            println!("   └─ Out of order: {}", capture.out_of_order);
        }

        println!("\n📦 Batches");
        for line in self.summary.to_string().lines() {
            println!("   {line}");
        }

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks ({})", self.sinks.len());
            for (i, sink) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} written, {} failed",
                    prefix,
                    sink.name,
                    sink.metrics.written(),
                    sink.metrics.failure_count
                );
            }
        }

        if let Some(output) = &self.output {
            println!("\n📁 Output: {}", output.display());
        }

        match self.verified {
            Some(true) => println!("\n✓ Stored batches reassemble into the input"),
            Some(false) => println!("\n⚠ Stored batches do not reassemble into the input"),
            None => {}
        }

        println!();
    }
}

fn rate_text(rate: Option<u32>) -> String {
    rate.map_or_else(|| "unset".to_string(), |r| r.to_string())
}

fn source_name(source: RateSource) -> &'static str {
    match source {
        RateSource::Estimated => "estimated",
        RateSource::Existing => "existing",
        RateSource::Fallback => "fallback",
        RateSource::Unset => "unset",
    }
}

/// JSON form of [`PipelineStats`]
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub session_id: String,
    pub duration_ms: f64,
    pub strategy: String,
    pub target_entries_per_batch: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_s: Option<f64>,
    pub batches: usize,
    pub accelerometer_entries: usize,
    pub gyroscope_entries: usize,
    pub min_entries: usize,
    pub max_entries: usize,
    pub mean_entries: f64,
    pub span_start: Option<f64>,
    pub span_end: Option<f64>,
    pub accelerometer_rate: Option<u32>,
    pub gyroscope_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_sources: Option<RateSourceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureReport>,
    pub sinks: Vec<SinkSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RateSourceReport {
    pub accelerometer: &'static str,
    pub gyroscope: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CaptureReport {
    pub accelerometer: u64,
    pub gyroscope: u64,
    pub out_of_order: u64,
}

#[derive(Debug, Serialize)]
pub struct SinkSummary {
    pub name: String,
    pub sessions_written: u64,
    pub batches_written: u64,
    pub failures: u64,
}
