//! Log writer with fsync enforcement.
//!
//! Every append is written, flushed, and forced to stable storage before the
//! caller observes success, so an acknowledged mutation survives a crash.
//! The file is opened in append mode and only ever truncated through
//! [`WalWriter::truncate`], which recreates it and fsyncs both the file and
//! its directory before reopening for append.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{WalError, WalResult};
use super::record::LogRecord;

/// Name of the log file inside the wal directory.
pub const LOG_FILE_NAME: &str = "wal.log";

/// Appends records to the durability log.
pub struct WalWriter {
    wal_path: PathBuf,
    file: File,
}

impl WalWriter {
    /// Opens or creates `<data_dir>/wal/wal.log`, creating parent
    /// directories as needed.
    pub fn open(data_dir: &Path) -> WalResult<Self> {
        let wal_dir = data_dir.join("wal");
        let wal_path = wal_dir.join(LOG_FILE_NAME);

        if !wal_dir.exists() {
            fs::create_dir_all(&wal_dir).map_err(|e| WalError::Open {
                path: wal_dir.clone(),
                source: e,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&wal_path)
            .map_err(|e| WalError::Open {
                path: wal_path.clone(),
                source: e,
            })?;

        Ok(Self { wal_path, file })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.wal_path
    }

    /// Appends one record and forces it to stable storage.
    pub fn append(&mut self, record: &LogRecord) -> WalResult<()> {
        let mut line = record.to_line()?;
        line.push('\n');
        self.file.write_all(line.as_bytes()).map_err(WalError::Append)?;
        self.file.flush().map_err(WalError::Append)?;
        self.file.sync_all().map_err(WalError::Sync)?;
        Ok(())
    }

    /// Truncates the log to empty.
    ///
    /// The old file is removed, a fresh empty file is created and fsync'd,
    /// the directory entry is fsync'd so the swap itself is durable, and the
    /// writer reopens the fresh file for append.
    pub fn truncate(&mut self) -> WalResult<()> {
        let wal_dir = self
            .wal_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();

        if self.wal_path.exists() {
            fs::remove_file(&self.wal_path).map_err(WalError::Truncate)?;
        }

        let fresh = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.wal_path)
            .map_err(WalError::Truncate)?;
        fresh.sync_all().map_err(WalError::Sync)?;

        let dir = OpenOptions::new()
            .read(true)
            .open(&wal_dir)
            .map_err(WalError::Truncate)?;
        dir.sync_all().map_err(WalError::Sync)?;

        self.file = OpenOptions::new()
            .append(true)
            .open(&self.wal_path)
            .map_err(|e| WalError::Open {
                path: self.wal_path.clone(),
                source: e,
            })?;

        Ok(())
    }
}
