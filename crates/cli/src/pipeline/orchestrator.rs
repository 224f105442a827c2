//! Pipeline orchestrator - coordinates capture, batching and persistence.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use batcher::MotionBatcher;
use capture::{CaptureSession, CaptureSnapshot, SyntheticSource};
use contracts::{
    BatchStrategy, MotionSeries, PipelineBlueprint, SinkConfig, SinkType, WorkoutInfo,
    WorkoutSession,
};
use dispatcher::DispatcherBuilder;
use observability::{record_pipeline_stage_ms, record_session_persisted, BatchMetricsAggregator};
use tracing::{info, warn};

use super::PipelineStats;

const DRY_RUN_SINK: &str = "dry-run";
const OUTPUT_SINK: &str = "output";

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Loaded (and CLI-overridden) configuration
    pub blueprint: PipelineBlueprint,

    /// Directory for file sinks; adds a file sink when none is configured
    pub output: Option<PathBuf>,

    /// Replace every sink with an in-memory one and verify the round trip
    pub dry_run: bool,

    /// Estimate rates even when the series already carries them
    pub force_estimate: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    batcher: MotionBatcher,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let batcher = MotionBatcher::new(config.blueprint.batcher.clone());
        Self { config, batcher }
    }

    /// Run a synthetic source until it finishes and return the captured session
    pub async fn capture(&self, source: SyntheticSource) -> Result<(WorkoutSession, CaptureSnapshot)> {
        let started = Instant::now();
        let mut capture = CaptureSession::start(&self.config.blueprint.capture);
        let source = Arc::new(source);

        info!(
            accelerometer_hz = source.config().accelerometer_hz,
            gyroscope_hz = source.config().gyroscope_hz,
            duration = ?source.config().duration,
            "Starting synthetic capture..."
        );
        capture
            .add_source(Box::new(Arc::clone(&source)))
            .context("Failed to start synthetic source")?;

        let failed = source.wait_finished().await;
        let series = capture.stop().await.context("Capture did not drain")?;
        anyhow::ensure!(failed == 0, "{failed} synthetic generator task(s) failed");
        let snapshot = capture.metrics();
        record_pipeline_stage_ms("capture", started.elapsed().as_secs_f64() * 1000.0);

        let info = WorkoutInfo {
            notes: Some(format!("synthetic capture from '{}'", source.config().name)),
            ..Default::default()
        };
        Ok((WorkoutSession::from_series(info, series), snapshot))
    }

    /// Estimate rates, batch, and persist one session to every sink
    pub async fn run(
        &self,
        mut session: WorkoutSession,
        capture: Option<CaptureSnapshot>,
    ) -> Result<PipelineStats> {
        let started = Instant::now();
        let series = &mut session.series;

        let needs_rates = series.accelerometer_rate.is_none() || series.gyroscope_rate.is_none();
        let rates = (self.config.force_estimate || needs_rates)
            .then(|| self.batcher.estimate_rates(series));

        info!(
            session_id = %session.id,
            accelerometer = series.accelerometer.len(),
            gyroscope = series.gyroscope.len(),
            accelerometer_rate = ?series.accelerometer_rate,
            gyroscope_rate = ?series.gyroscope_rate,
            "Batching session..."
        );

        let plan = self
            .batcher
            .batch(&session.series)
            .context("Failed to batch session")?;
        record_pipeline_stage_ms("batch", started.elapsed().as_secs_f64() * 1000.0);

        let sinks = self.sink_configs();
        if sinks.is_empty() {
            warn!("No sinks configured - batches will not be persisted");
        }
        let dispatcher = DispatcherBuilder::new(sinks)
            .build()
            .context("Failed to create dispatcher")?;
        let store = dispatcher.memory_store().clone();

        let persist_started = Instant::now();
        let record = dispatcher.persist(&session, &plan.batches).await;
        let reports = dispatcher.shutdown().await;
        record_pipeline_stage_ms("persist", persist_started.elapsed().as_secs_f64() * 1000.0);
        record_session_persisted(record.number_of_batches);

        let mut metrics = BatchMetricsAggregator::new();
        metrics.update(&plan);
        for report in &reports {
            metrics.record_sink(
                &report.name,
                report.metrics.written(),
                report.metrics.failure_count,
            );
            if report.metrics.failure_count > 0 {
                warn!(
                    sink = %report.name,
                    failures = report.metrics.failure_count,
                    "Sink failed to write some records"
                );
            }
        }

        let verified = if self.config.dry_run {
            let strategy = plan.summary.strategy;
            Some(store.get(session.id).is_some_and(|stored| {
                stored.is_complete()
                    && round_trip_matches(strategy, &stored.reassemble(), &session.series)
            }))
        } else {
            None
        };

        let stats = PipelineStats {
            session_id: session.id.to_string(),
            duration: started.elapsed(),
            capture,
            rates,
            accelerometer_rate: session.series.accelerometer_rate,
            gyroscope_rate: session.series.gyroscope_rate,
            summary: plan.summary,
            sinks: reports,
            verified,
            output: self.output_dir(),
            metrics,
        };

        info!(
            batches = stats.summary.batch_count,
            duration_ms = stats.duration.as_secs_f64() * 1000.0,
            "Pipeline complete"
        );
        Ok(stats)
    }

    /// Sinks for this run after applying dry-run and output overrides
    fn sink_configs(&self) -> Vec<SinkConfig> {
        if self.config.dry_run {
            return vec![SinkConfig::new(DRY_RUN_SINK, SinkType::Memory)];
        }

        let mut sinks = self.config.blueprint.sinks.clone();
        if let Some(output) = &self.config.output {
            let base = output.display().to_string();
            let mut has_file_sink = false;
            for sink in sinks.iter_mut().filter(|s| s.sink_type == SinkType::File) {
                sink.params.insert("base_path".to_string(), base.clone());
                has_file_sink = true;
            }
            if !has_file_sink {
                sinks.push(
                    SinkConfig::new(OUTPUT_SINK, SinkType::File).with_param("base_path", base),
                );
            }
        }
        sinks
    }

    fn output_dir(&self) -> Option<PathBuf> {
        if self.config.dry_run {
            return None;
        }
        self.config.output.clone().or_else(|| {
            self.config
                .blueprint
                .sinks
                .iter()
                .find(|s| s.sink_type == SinkType::File)
                .and_then(|s| s.params.get("base_path"))
                .map(PathBuf::from)
        })
    }
}

/// Time-window batches keep every sample; count batches may drop trailing gyroscope samples
fn round_trip_matches(strategy: BatchStrategy, stored: &MotionSeries, input: &MotionSeries) -> bool {
    match strategy {
        BatchStrategy::TimeInterval => stored == input,
        BatchStrategy::Count => {
            stored.accelerometer == input.accelerometer
                && input.gyroscope.starts_with(&stored.gyroscope)
        }
    }
}
