//! Record sink - appends accepted records to a CSV store
//!
//! The store is a plain CSV file with a fixed 5-column header written
//! exactly once, on first use. Every append opens the file in append mode,
//! writes one row, flushes and closes, so a row that `append` confirmed is
//! on disk even if the process dies immediately after. The file is never
//! truncated or rewritten.

use crate::domain::ParsedRecord;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column order of the persisted store
pub const HEADER: [&str; 5] =
    ["Identifier", "Model Number", "Trimmed Model Number", "Destination Code", "Serial Number"];

/// Errors surfaced by the sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only CSV store for parsed records
pub struct RecordSink {
    file_path: PathBuf,
}

impl RecordSink {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self { file_path: file_path.as_ref().to_path_buf() }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Create the store with its header iff it does not exist yet
    ///
    /// Safe to call on every start: an existing store is left untouched and
    /// later appends land after its last row.
    pub fn ensure_initialized(&self) -> Result<(), SinkError> {
        if self.file_path.exists() {
            debug!(file = %self.file_path.display(), "sink_already_initialized");
            return Ok(());
        }

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create_new(true).append(true).open(&self.file_path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(HEADER)?;
        writer.flush()?;

        info!(file = %self.file_path.display(), "sink_initialized");
        Ok(())
    }

    /// Append one record as a CSV row, durable before return
    pub fn append(&self, record: &ParsedRecord) -> Result<(), SinkError> {
        let file = OpenOptions::new().append(true).open(&self.file_path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record([
            record.identifier.as_str(),
            record.model_number.as_str(),
            record.trimmed_model_number.as_str(),
            record.destination_code.as_str(),
            record.serial_number.as_str(),
        ])?;
        writer.flush()?;

        debug!(
            identifier = %record.identifier,
            file = %self.file_path.display(),
            "record_appended"
        );
        Ok(())
    }
}
