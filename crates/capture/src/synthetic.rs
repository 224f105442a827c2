//! Synthetic motion source
//!
//! Generates a squat-like accelerometer and gyroscope trace for runs
//! without a device.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use contracts::{Sample, SensorKind};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::source::{SampleSender, SampleSource};

/// Shortest tick a realtime stream uses
pub const MIN_REALTIME_PERIOD: Duration = Duration::from_micros(1);

/// Highest rate a realtime stream can honour
pub const MAX_REALTIME_HZ: f64 = 1_000_000.0;

/// How synthetic timestamps advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntheticClock {
    /// Emit at wall-clock pace
    Realtime,
    /// Emit as fast as the channel allows with evenly spaced timestamps
    #[default]
    Simulated,
}

/// Synthetic source configuration
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub name: String,

    /// Accelerometer rate (Hz), 0 disables the stream
    pub accelerometer_hz: f64,

    /// Gyroscope rate (Hz), 0 disables the stream
    pub gyroscope_hz: f64,

    /// Stop by itself after this long; `None` runs until stopped
    pub duration: Option<Duration>,

    /// Timestamp of the first sample (seconds)
    pub start_timestamp: f64,

    /// Repetitions per second of the generated movement
    pub cadence_hz: f64,

    pub clock: SyntheticClock,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            name: "synthetic".to_string(),
            accelerometer_hz: 50.0,
            gyroscope_hz: 25.0,
            duration: Some(Duration::from_secs(10)),
            start_timestamp: 0.0,
            cadence_hz: 0.4,
            clock: SyntheticClock::Simulated,
        }
    }
}

/// Synthetic accelerometer + gyroscope source
pub struct SyntheticSource {
    config: SyntheticConfig,
    running: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Simulated-clock source that stops after `duration`
    pub fn simulated(accelerometer_hz: f64, gyroscope_hz: f64, duration: Duration) -> Self {
        Self::new(SyntheticConfig {
            accelerometer_hz,
            gyroscope_hz,
            duration: Some(duration),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Wait until every generator task has exited
    ///
    /// Returns how many generators panicked or were cancelled; each one is
    /// logged at error level.
    pub async fn wait_finished(&self) -> usize {
        let handles: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        let mut failed = 0;
        for handle in handles {
            if let Err(e) = handle.await {
                error!(source = %self.config.name, error = %e, "synthetic generator failed");
                failed += 1;
            }
        }
        failed
    }

    fn spawn_stream(&self, sensor: SensorKind, hz: f64, tx: SampleSender) -> JoinHandle<()> {
        let config = self.config.clone();
        let running = self.running.clone();
        let active = self.active.clone();
        active.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            debug!(source = %config.name, sensor = %sensor, hz, "synthetic stream started");
            let sent = match config.clock {
                SyntheticClock::Simulated => run_simulated(&config, sensor, hz, &running, &tx).await,
                SyntheticClock::Realtime => run_realtime(&config, sensor, hz, &running, &tx).await,
            };
            active.fetch_sub(1, Ordering::SeqCst);
            debug!(source = %config.name, sensor = %sensor, sent, "synthetic stream stopped");
        })
    }
}

async fn run_simulated(
    config: &SyntheticConfig,
    sensor: SensorKind,
    hz: f64,
    running: &AtomicBool,
    tx: &SampleSender,
) -> u64 {
    let limit = config
        .duration
        .map(|d| (d.as_secs_f64() * hz).floor() as u64);
    let mut i: u64 = 0;

    while running.load(Ordering::Relaxed) && limit.is_none_or(|n| i < n) {
        let elapsed = i as f64 / hz;
        let sample = motion_sample(sensor, config.start_timestamp + elapsed, elapsed, config.cadence_hz);
        if tx.send(sensor, sample).await.is_err() {
            break;
        }
        i += 1;
        if limit.is_none() {
            tokio::task::yield_now().await;
        }
    }
    i
}

async fn run_realtime(
    config: &SyntheticConfig,
    sensor: SensorKind,
    hz: f64,
    running: &AtomicBool,
    tx: &SampleSender,
) -> u64 {
    let mut ticker = tokio::time::interval(realtime_period(hz));
    let start = Instant::now();
    let mut sent: u64 = 0;

    while running.load(Ordering::Relaxed) {
        ticker.tick().await;
        let elapsed = start.elapsed();
        if config.duration.is_some_and(|d| elapsed >= d) {
            break;
        }
        let elapsed = elapsed.as_secs_f64();
        let sample = motion_sample(sensor, config.start_timestamp + elapsed, elapsed, config.cadence_hz);
        if tx.send(sensor, sample).await.is_err() {
            break;
        }
        sent += 1;
        trace!(sensor = %sensor, timestamp = sample.timestamp, "synthetic sample sent");
    }
    sent
}

/// Tick length for `hz`, never shorter than [`MIN_REALTIME_PERIOD`]
fn realtime_period(hz: f64) -> Duration {
    match Duration::try_from_secs_f64(1.0 / hz) {
        Ok(period) if period >= MIN_REALTIME_PERIOD => period,
        _ => {
            warn!(hz, max_hz = MAX_REALTIME_HZ, "realtime rate too high, clamping tick");
            MIN_REALTIME_PERIOD
        }
    }
}

/// One reading of a repeated squat: vertical acceleration oscillates
/// around -1 g while the thigh pitches about the x axis.
fn motion_sample(sensor: SensorKind, timestamp: f64, elapsed: f64, cadence_hz: f64) -> Sample {
    let phase = TAU * cadence_hz * elapsed;
    match sensor {
        SensorKind::Accelerometer => Sample::new(
            timestamp,
            0.02 * (3.0 * phase).sin(),
            0.05 * phase.cos(),
            -1.0 + 0.35 * phase.sin(),
        ),
        SensorKind::Gyroscope => Sample::new(
            timestamp,
            1.2 * phase.cos(),
            0.1 * (2.0 * phase).sin(),
            0.05 * phase.sin(),
        ),
    }
}

impl SampleSource for SyntheticSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn start(&self, tx: SampleSender) {
        self.running.store(true, Ordering::SeqCst);
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        for (sensor, hz) in [
            (SensorKind::Accelerometer, self.config.accelerometer_hz),
            (SensorKind::Gyroscope, self.config.gyroscope_hz),
        ] {
            if hz > 0.0 {
                handles.push(self.spawn_stream(sensor, hz, tx.clone()));
            }
        }
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed) && self.active.load(Ordering::SeqCst) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn channels() -> (SampleSender, mpsc::Receiver<Sample>, mpsc::Receiver<Sample>) {
        let (a_tx, a_rx) = mpsc::channel(16);
        let (g_tx, g_rx) = mpsc::channel(16);
        (SampleSender::new(a_tx, g_tx), a_rx, g_rx)
    }

    async fn drain(mut rx: mpsc::Receiver<Sample>) -> Vec<Sample> {
        let mut out = Vec::new();
        while let Some(s) = rx.recv().await {
            out.push(s);
        }
        out
    }

    #[tokio::test]
    async fn test_simulated_counts_and_spacing() {
        let source = SyntheticSource::simulated(50.0, 25.0, Duration::from_secs(2));
        let (tx, a_rx, g_rx) = channels();
        source.start(tx);

        let (accel, gyro) = tokio::join!(drain(a_rx), drain(g_rx));
        assert_eq!(accel.len(), 100);
        assert_eq!(gyro.len(), 50);
        assert!((accel[1].timestamp - accel[0].timestamp - 0.02).abs() < 1e-12);
        assert!(accel.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        assert_eq!(source.wait_finished().await, 0);
        assert!(!source.is_running());
    }

    #[test]
    fn test_realtime_period_is_clamped() {
        assert_eq!(realtime_period(100.0), Duration::from_millis(10));
        assert_eq!(realtime_period(MAX_REALTIME_HZ), MIN_REALTIME_PERIOD);
        assert_eq!(realtime_period(1e10), MIN_REALTIME_PERIOD);
        assert_eq!(realtime_period(f64::INFINITY), MIN_REALTIME_PERIOD);
    }

    #[tokio::test]
    async fn test_realtime_rate_above_clock_resolution_still_emits() {
        let source = SyntheticSource::new(SyntheticConfig {
            accelerometer_hz: 1e10,
            gyroscope_hz: 30.0,
            duration: Some(Duration::from_millis(50)),
            clock: SyntheticClock::Realtime,
            ..Default::default()
        });
        let (tx, a_rx, g_rx) = channels();
        source.start(tx);

        let (accel, gyro) = tokio::join!(drain(a_rx), drain(g_rx));
        assert_eq!(source.wait_finished().await, 0);
        assert!(!accel.is_empty());
        assert!(!gyro.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_stream_sends_nothing() {
        let source = SyntheticSource::simulated(20.0, 0.0, Duration::from_secs(1));
        let (tx, a_rx, g_rx) = channels();
        source.start(tx);

        let (accel, gyro) = tokio::join!(drain(a_rx), drain(g_rx));
        assert_eq!(accel.len(), 20);
        assert!(gyro.is_empty());
    }

    #[tokio::test]
    async fn test_stop_ends_unbounded_stream() {
        let source = SyntheticSource::new(SyntheticConfig {
            duration: None,
            ..Default::default()
        });
        let (tx, mut a_rx, g_rx) = channels();
        source.start(tx);

        assert!(a_rx.recv().await.is_some());
        source.stop();
        drop(g_rx);
        while a_rx.recv().await.is_some() {}
        source.wait_finished().await;
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_realtime_emits_in_order() {
        let source = SyntheticSource::new(SyntheticConfig {
            accelerometer_hz: 200.0,
            gyroscope_hz: 100.0,
            duration: Some(Duration::from_millis(100)),
            start_timestamp: 1000.0,
            clock: SyntheticClock::Realtime,
            ..Default::default()
        });
        let (tx, a_rx, g_rx) = channels();
        source.start(tx);

        let (accel, gyro) = tokio::join!(drain(a_rx), drain(g_rx));
        assert!(!accel.is_empty());
        assert!(!gyro.is_empty());
        assert!(accel[0].timestamp >= 1000.0);
        assert!(accel.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
