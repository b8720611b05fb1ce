//! Sequential log replay.
//!
//! Reads one JSON record per line, in file order. A line that fails to
//! parse is skipped and counted, and recovery keeps going; it never halts on a
//! torn or corrupted entry. IO failures are surfaced; they are not
//! skippable.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::errors::{WalError, WalResult};
use super::record::LogRecord;

/// Reads log records sequentially for replay.
pub struct WalReader {
    reader: BufReader<File>,
    skipped: usize,
}

impl WalReader {
    /// Opens a log file for replay.
    pub fn open(wal_path: &Path) -> WalResult<Self> {
        let file = File::open(wal_path).map_err(|e| WalError::Open {
            path: wal_path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            reader: BufReader::new(file),
            skipped: 0,
        })
    }

    /// Reads the next well-formed record.
    ///
    /// Malformed lines are skipped and counted; blank lines are ignored.
    /// Returns `Ok(None)` at end of file.
    pub fn read_next(&mut self) -> WalResult<Option<LogRecord>> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes = self.reader.read_line(&mut line).map_err(WalError::Read)?;
            if bytes == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match LogRecord::from_line(trimmed) {
                Ok(record) => return Ok(Some(record)),
                Err(_) => {
                    self.skipped += 1;
                }
            }
        }
    }

    /// Reads every remaining well-formed record in file order.
    pub fn read_all(&mut self) -> WalResult<Vec<LogRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
