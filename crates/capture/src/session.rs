//! Capture session: per-sensor channels, collectors and the stop barrier

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use contracts::{CaptureConfig, MotionSeries, Sample, SensorKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::counters::{CaptureMetrics, CaptureSnapshot};
use crate::error::{CaptureError, Result};
use crate::source::{SampleSender, SampleSource};

type Drain = Pin<Box<dyn Future<Output = Result<MotionSeries>> + Send>>;

/// A running capture
///
/// Owns one bounded channel and one collector task per sensor. Producers
/// either register as a [`SampleSource`] or take a [`SampleSender`].
pub struct CaptureSession {
    sender: Option<SampleSender>,
    sources: Vec<Box<dyn SampleSource>>,
    collectors: Option<[JoinHandle<Vec<Sample>>; 2]>,
    /// Join of both collectors left pending by a timed-out `stop`
    draining: Option<Drain>,
    metrics: Arc<CaptureMetrics>,
    stop_timeout: Option<Duration>,
}

impl CaptureSession {
    /// Open channels and spawn the collectors. Must run inside a tokio runtime.
    #[instrument(
        name = "capture_session_start",
        skip(config),
        fields(channel_capacity = config.channel_capacity)
    )]
    pub fn start(config: &CaptureConfig) -> Self {
        let metrics = Arc::new(CaptureMetrics::new());
        let capacity = config.channel_capacity.max(1);

        let (a_tx, a_rx) = mpsc::channel(capacity);
        let (g_tx, g_rx) = mpsc::channel(capacity);
        let collectors = [
            tokio::spawn(collect(SensorKind::Accelerometer, a_rx, metrics.clone())),
            tokio::spawn(collect(SensorKind::Gyroscope, g_rx, metrics.clone())),
        ];

        info!("capture session started");

        Self {
            sender: Some(SampleSender::new(a_tx, g_tx)),
            sources: Vec::new(),
            collectors: Some(collectors),
            draining: None,
            metrics,
            stop_timeout: (config.stop_timeout_ms > 0)
                .then(|| Duration::from_millis(config.stop_timeout_ms)),
        }
    }

    /// Start a source and keep it until `stop`
    ///
    /// # Errors
    /// `AlreadyStopped` after `stop` has been called.
    pub fn add_source(&mut self, source: Box<dyn SampleSource>) -> Result<()> {
        let tx = self.sender()?;
        debug!(source = source.name(), "starting sample source");
        source.start(tx);
        self.sources.push(source);
        Ok(())
    }

    /// Producer handle for callers that push samples themselves
    ///
    /// # Errors
    /// `AlreadyStopped` after `stop` has been called.
    pub fn sender(&self) -> Result<SampleSender> {
        self.sender.clone().ok_or(CaptureError::AlreadyStopped)
    }

    pub fn metrics(&self) -> CaptureSnapshot {
        self.metrics.snapshot()
    }

    /// True once `stop` has returned the series
    pub fn is_stopped(&self) -> bool {
        self.collectors.is_none() && self.draining.is_none()
    }

    /// Stop every source and wait for both queues to drain.
    ///
    /// Returns once every producer has dropped its sender and each
    /// collector has taken every queued sample. Rates on the returned
    /// series are unset.
    ///
    /// On `DrainTimeout` the sources stay stopped and no new senders are
    /// handed out, but the collectors keep running: calling `stop` again
    /// resumes waiting for the same drain and returns every sample.
    ///
    /// # Errors
    /// - `AlreadyStopped` once a series has been returned
    /// - `DrainTimeout` if producers still hold senders after the stop timeout
    /// - `CollectorPanicked` if a collector task failed
    #[instrument(name = "capture_session_stop", skip(self))]
    pub async fn stop(&mut self) -> Result<MotionSeries> {
        let mut drain = match self.draining.take() {
            Some(pending) => {
                debug!("resuming drain after timeout");
                pending
            }
            None => self.begin_drain()?,
        };

        let mut series = match self.stop_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut drain).await {
                Ok(joined) => joined?,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "producers still hold senders");
                    self.draining = Some(drain);
                    return Err(CaptureError::DrainTimeout {
                        timeout_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => drain.await?,
        };

        let snapshot = self.metrics.snapshot();
        if snapshot.out_of_order > 0 {
            warn!(
                out_of_order = snapshot.out_of_order,
                "samples arrived out of order; sorting by timestamp"
            );
            for sensor in SensorKind::ALL {
                series
                    .samples_mut(sensor)
                    .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
            }
        }

        info!(
            accelerometer = series.accelerometer.len(),
            gyroscope = series.gyroscope.len(),
            "capture session stopped"
        );
        Ok(series)
    }
}

impl CaptureSession {
    /// Stop sources, close the session's own sender and start joining the collectors
    fn begin_drain(&mut self) -> Result<Drain> {
        let [accel, gyro] = self.collectors.take().ok_or(CaptureError::AlreadyStopped)?;

        for source in &self.sources {
            debug!(source = source.name(), "stopping sample source");
            source.stop();
        }
        self.sender = None;

        Ok(Box::pin(async move {
            let accelerometer = join_collector(SensorKind::Accelerometer, accel).await?;
            let gyroscope = join_collector(SensorKind::Gyroscope, gyro).await?;
            Ok(MotionSeries::new(accelerometer, gyroscope))
        }))
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        for source in &self.sources {
            source.stop();
        }
    }
}

async fn collect(
    sensor: SensorKind,
    mut rx: mpsc::Receiver<Sample>,
    metrics: Arc<CaptureMetrics>,
) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut last = f64::NEG_INFINITY;

    while let Some(sample) = rx.recv().await {
        metrics.record_received(sensor);
        if sample.timestamp < last {
            metrics.record_out_of_order(sensor);
        } else {
            last = sample.timestamp;
        }
        samples.push(sample);
    }

    debug!(sensor = %sensor, count = samples.len(), "collector drained");
    samples
}

async fn join_collector(sensor: SensorKind, handle: JoinHandle<Vec<Sample>>) -> Result<Vec<Sample>> {
    handle.await.map_err(|e| CaptureError::CollectorPanicked {
        sensor,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticSource;

    fn config(stop_timeout_ms: u64) -> CaptureConfig {
        CaptureConfig {
            channel_capacity: 4,
            stop_timeout_ms,
        }
    }

    fn sample(t: f64) -> Sample {
        Sample::new(t, 0.0, 0.0, -1.0)
    }

    #[tokio::test]
    async fn test_stop_drains_everything_sent() {
        let mut session = CaptureSession::start(&config(5000));
        let tx = session.sender().unwrap();

        let producer = tokio::spawn(async move {
            for i in 0..500 {
                tx.send(SensorKind::Accelerometer, sample(i as f64 * 0.01))
                    .await
                    .unwrap();
                if i % 2 == 0 {
                    tx.send(SensorKind::Gyroscope, sample(i as f64 * 0.01))
                        .await
                        .unwrap();
                }
            }
        });

        let series = session.stop().await.unwrap();
        producer.await.unwrap();

        assert_eq!(series.accelerometer.len(), 500);
        assert_eq!(series.gyroscope.len(), 250);
        assert_eq!(series.accelerometer_rate, None);
        assert_eq!(session.metrics().total(), 750);
    }

    #[tokio::test]
    async fn test_second_stop_errors() {
        let mut session = CaptureSession::start(&config(5000));
        session.stop().await.unwrap();

        assert!(session.is_stopped());
        assert!(matches!(
            session.stop().await,
            Err(CaptureError::AlreadyStopped)
        ));
        assert!(matches!(session.sender(), Err(CaptureError::AlreadyStopped)));
    }

    #[tokio::test]
    async fn test_held_sender_times_out() {
        let mut session = CaptureSession::start(&config(50));
        let _held = session.sender().unwrap();

        assert!(matches!(
            session.stop().await,
            Err(CaptureError::DrainTimeout { timeout_ms: 50 })
        ));
    }

    #[tokio::test]
    async fn test_stop_retries_after_timeout_without_losing_samples() {
        let mut session = CaptureSession::start(&config(50));
        let held = session.sender().unwrap();
        for i in 0..3 {
            held.send(SensorKind::Accelerometer, sample(i as f64)).await.unwrap();
        }
        held.send(SensorKind::Gyroscope, sample(0.5)).await.unwrap();

        assert!(matches!(
            session.stop().await,
            Err(CaptureError::DrainTimeout { .. })
        ));
        assert!(!session.is_stopped());
        assert!(matches!(session.sender(), Err(CaptureError::AlreadyStopped)));

        held.send(SensorKind::Accelerometer, sample(3.0)).await.unwrap();
        drop(held);

        let series = session.stop().await.unwrap();
        assert!(session.is_stopped());
        assert_eq!(series.timestamps(SensorKind::Accelerometer), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(series.gyroscope.len(), 1);
        assert!(matches!(session.stop().await, Err(CaptureError::AlreadyStopped)));
    }

    #[tokio::test]
    async fn test_out_of_order_arrivals_are_sorted() {
        let mut session = CaptureSession::start(&config(5000));
        let tx = session.sender().unwrap();
        for t in [0.0, 0.02, 0.01, 0.03] {
            tx.send(SensorKind::Gyroscope, sample(t)).await.unwrap();
        }
        drop(tx);

        let series = session.stop().await.unwrap();
        assert_eq!(session.metrics().out_of_order, 1);
        assert_eq!(
            series.timestamps(SensorKind::Gyroscope),
            vec![0.0, 0.01, 0.02, 0.03]
        );
    }

    #[tokio::test]
    async fn test_synthetic_source_through_session() {
        let mut session = CaptureSession::start(&config(5000));
        let source = Arc::new(SyntheticSource::simulated(50.0, 25.0, Duration::from_secs(3)));
        session.add_source(Box::new(source.clone())).unwrap();

        source.wait_finished().await;
        let series = session.stop().await.unwrap();

        assert_eq!(series.accelerometer.len(), 150);
        assert_eq!(series.gyroscope.len(), 75);
    }
}
