//! FileSink - one directory per session, one JSON file per record
//!
//! Layout:
//! ```text
//! <base_path>/<session_id>/session.json
//! <base_path>/<session_id>/batches/<batch_number>.json
//! ```

use contracts::{BatchRecord, BatchSink, ContractError, SessionRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};
use uuid::Uuid;

pub(crate) const SESSION_FILE: &str = "session.json";
pub(crate) const BATCH_DIR: &str = "batches";

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,

    /// Indent JSON output
    pub pretty: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));
        let pretty = params
            .get("pretty")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        Self { base_path, pretty }
    }
}

/// Directory of one session under `base`
pub fn session_dir(base: &Path, session_id: Uuid) -> PathBuf {
    base.join(session_id.to_string())
}

/// Sink that writes records to disk as JSON
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    created_dirs: HashSet<PathBuf>,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            created_dirs: HashSet::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    fn ensure_dir(&mut self, dir: PathBuf) -> std::io::Result<PathBuf> {
        if !self.created_dirs.contains(&dir) {
            fs::create_dir_all(&dir)?;
            self.created_dirs.insert(dir.clone());
        }
        Ok(dir)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        if self.config.pretty {
            serde_json::to_writer_pretty(&mut writer, value)
        } else {
            serde_json::to_writer(&mut writer, value)
        }
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.flush()
    }

    fn persist<T: Serialize>(
        &mut self,
        record: &'static str,
        dir: PathBuf,
        file: String,
        value: &T,
    ) -> Result<(), ContractError> {
        let result = self
            .ensure_dir(dir)
            .and_then(|dir| self.write_json(&dir.join(&file), value));
        result.map_err(|e| {
            error!(sink = %self.name, file = %file, error = %e, "Write failed");
            ContractError::sink_write(&self.name, record, e.to_string())
        })
    }
}

impl BatchSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write_session",
        skip(self, record),
        fields(sink = %self.name, session_id = %record.session_id)
    )]
    async fn write_session(&mut self, record: &SessionRecord) -> Result<(), ContractError> {
        let dir = session_dir(&self.config.base_path, record.session_id);
        self.persist("session", dir, SESSION_FILE.to_string(), record)
    }

    #[instrument(
        name = "file_sink_write_batch",
        skip(self, record),
        fields(sink = %self.name, batch_number = record.batch_number)
    )]
    async fn write_batch(&mut self, record: &BatchRecord) -> Result<(), ContractError> {
        let dir = session_dir(&self.config.base_path, record.session_id).join(BATCH_DIR);
        self.persist("batch", dir, format!("{}.json", record.batch_number), record)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, dirs = self.created_dirs.len(), "FileSink closed");
        Ok(())
    }
}
