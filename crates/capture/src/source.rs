//! Sample producers

use std::sync::Arc;

use contracts::{Sample, SensorKind};
use tokio::sync::mpsc;

use crate::error::{CaptureError, Result};

/// Producer handle into a capture session
///
/// Cloneable. The session only finishes draining once every clone has
/// been dropped.
#[derive(Debug, Clone)]
pub struct SampleSender {
    accelerometer: mpsc::Sender<Sample>,
    gyroscope: mpsc::Sender<Sample>,
}

impl SampleSender {
    pub(crate) fn new(accelerometer: mpsc::Sender<Sample>, gyroscope: mpsc::Sender<Sample>) -> Self {
        Self {
            accelerometer,
            gyroscope,
        }
    }

    fn channel(&self, sensor: SensorKind) -> &mpsc::Sender<Sample> {
        match sensor {
            SensorKind::Accelerometer => &self.accelerometer,
            SensorKind::Gyroscope => &self.gyroscope,
        }
    }

    /// Send one sample, waiting for channel capacity
    ///
    /// # Errors
    /// `ChannelClosed` when the collector for `sensor` has exited.
    pub async fn send(&self, sensor: SensorKind, sample: Sample) -> Result<()> {
        self.channel(sensor)
            .send(sample)
            .await
            .map_err(|_| CaptureError::ChannelClosed { sensor })
    }

    /// True once the collector for `sensor` has exited
    pub fn is_closed(&self, sensor: SensorKind) -> bool {
        self.channel(sensor).is_closed()
    }
}

/// A motion data producer
///
/// Implementations spawn their own tasks in `start` and feed samples
/// through the given sender. Dropping every sender clone signals the
/// collectors that this producer is done.
pub trait SampleSource: Send + Sync {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Begin producing samples
    fn start(&self, tx: SampleSender);

    /// Ask the producer to stop; it must then drop its senders
    fn stop(&self);

    /// Whether the producer is still emitting
    fn is_running(&self) -> bool;
}

impl<T: SampleSource + ?Sized> SampleSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn start(&self, tx: SampleSender) {
        (**self).start(tx)
    }

    fn stop(&self) {
        (**self).stop()
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}
