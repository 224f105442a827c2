//! PipelineBlueprint - Config Loader output
//!
//! Describes the complete pipeline configuration: batching policy, capture
//! channels, and output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default total entries (accelerometer + gyroscope) per batch
pub const DEFAULT_TARGET_ENTRIES_PER_BATCH: usize = 10_000;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Batching policy
    #[serde(default)]
    pub batcher: BatcherConfig,

    /// Capture channel settings
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// How a series is partitioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStrategy {
    /// Fixed entry count split by relative capture rate
    Count,
    /// Fixed time window sized from the combined capture rate
    #[default]
    TimeInterval,
}

impl BatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStrategy::Count => "count",
            BatchStrategy::TimeInterval => "time_interval",
        }
    }
}

impl std::fmt::Display for BatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Batcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatcherConfig {
    /// Batching strategy
    #[serde(default)]
    pub strategy: BatchStrategy,

    /// Target total entries per batch
    #[serde(default = "default_target_entries")]
    pub target_entries_per_batch: usize,

    /// Apply default rates when estimation cannot produce one
    #[serde(default = "default_true")]
    pub fallback_rates: bool,

    /// Accelerometer rate used when unset and not estimable (Hz)
    #[serde(default = "default_accelerometer_rate")]
    pub default_accelerometer_rate: u32,

    /// Gyroscope rate used when unset and not estimable (Hz)
    #[serde(default = "default_gyroscope_rate")]
    pub default_gyroscope_rate: u32,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            strategy: BatchStrategy::default(),
            target_entries_per_batch: DEFAULT_TARGET_ENTRIES_PER_BATCH,
            fallback_rates: true,
            default_accelerometer_rate: default_accelerometer_rate(),
            default_gyroscope_rate: default_gyroscope_rate(),
        }
    }
}

fn default_target_entries() -> usize {
    DEFAULT_TARGET_ENTRIES_PER_BATCH
}

fn default_true() -> bool {
    true
}

fn default_accelerometer_rate() -> u32 {
    50
}

fn default_gyroscope_rate() -> u32 {
    25
}

/// Capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Per-sensor channel capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Upper bound on the stop barrier (milliseconds, 0 = wait forever)
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_stop_timeout_ms() -> u64 {
    5000
}

/// Sink output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// Sink with the default queue capacity and no parameters
    pub fn new(name: impl Into<String>, sink_type: SinkType) -> Self {
        Self {
            name: name.into(),
            sink_type,
            queue_capacity: default_queue_capacity(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

fn default_queue_capacity() -> usize {
    64
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// JSON files on disk
    File,
    /// tracing summary only
    Log,
    /// In-process store
    Memory,
}
