use std::mem;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::storage::{StorageError, StorageFile, StorageMedium, MAX_FILE_SIZE};

/// Highest per-day file sequence number; all taken means the day is full.
pub const MAX_DAILY_FILES: u32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("no free log file name left for today")]
    Capacity,
}

/// Static configuration for one logger instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Stable identifier embedded in every file name.
    pub logger_id: String,
    /// Directory holding all log files, created on demand.
    pub base_dir: String,
    /// Text written at the top of every file.
    pub header: String,
    /// In-memory buffer limit in bytes.
    pub capacity: usize,
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Buffered logger writing append-only files with size rotation and
/// hot-swap (media removal) handling.
///
/// Records accumulate in a bounded buffer and reach the media when the
/// buffer fills, when the file is closed, or on an explicit [`flush`].
/// While detached, records accumulate in the buffer only; on overflow the
/// buffer restarts from the header, which is the designed degradation when
/// the media is physically absent.
///
/// [`flush`]: BufferedFileLogger::flush
pub struct BufferedFileLogger<S: StorageMedium, C: Clock> {
    storage: S,
    clock: C,
    config: LoggerConfig,
    file: Option<S::File>,
    file_name: String,
    buffer: String,
    attached: bool,
}

impl<S: StorageMedium, C: Clock> BufferedFileLogger<S, C> {
    pub fn new(storage: S, clock: C, config: LoggerConfig) -> Self {
        let mut buffer = String::with_capacity(config.capacity);
        buffer.push_str(&config.header);
        Self {
            storage,
            clock,
            config,
            file: None,
            file_name: String::new(),
            buffer,
            attached: true,
        }
    }

    /// Name of the most recently created file, empty before the first one.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Data currently held in memory and not yet on the media.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Creates and opens a fresh log file.
    ///
    /// Ensures the base directory exists, then takes the first free name
    /// of the form `/<base_dir>/<logger_id>-YYYY-MM-DD_NNNN.txt` with the
    /// sequence suffix starting at `0001`. Fails with [`LogError::Capacity`]
    /// once all 9999 suffixes for the day are taken.
    pub fn create_file(&mut self) -> Result<(), LogError> {
        if !self.config.base_dir.is_empty() && !self.storage.exists(&self.config.base_dir) {
            self.storage.create_dir(&self.config.base_dir)?;
        }

        let date = self.clock.today();
        let mut file_name = None;
        for seq in 1..=MAX_DAILY_FILES {
            let candidate = format!(
                "/{}/{}-{:04}-{:02}-{:02}_{:04}.txt",
                self.config.base_dir,
                self.config.logger_id,
                date.year,
                date.month,
                date.day,
                seq
            );
            if !self.storage.exists(&candidate) {
                file_name = Some(candidate);
                break;
            }
        }
        let Some(file_name) = file_name else {
            return Err(LogError::Capacity);
        };

        let file = self.storage.create(&file_name)?;
        debug!(file = %file_name, "opened new log file");
        self.file = Some(file);
        self.file_name = file_name;
        Ok(())
    }

    /// Appends one record.
    ///
    /// Attached, this flushes and rotates as needed and can touch storage;
    /// detached, it only buffers and always succeeds, discarding the oldest
    /// buffered data on overflow.
    pub fn append(&mut self, data: &str) -> Result<(), LogError> {
        if self.attached {
            return self.write_or_append(data);
        }

        if self.buffer.len() + data.len() > self.config.capacity {
            warn!("buffer full while detached, discarding buffered records");
            self.buffer.clear();
            self.buffer.push_str(&self.config.header);
        }
        let room = self.config.capacity.saturating_sub(self.buffer.len());
        if data.len() > room {
            // keep the freshest tail that still fits
            let mut start = data.len() - room;
            while !data.is_char_boundary(start) {
                start += 1;
            }
            self.buffer.push_str(&data[start..]);
        } else {
            self.buffer.push_str(data);
        }
        Ok(())
    }

    // Attached-mode path: make room, rotate at the media ceiling, buffer
    // the record.
    fn write_or_append(&mut self, data: &str) -> Result<(), LogError> {
        if self.buffer.len() + data.len() > self.config.capacity {
            self.flush()?;
            self.buffer.clear();
        }

        let position = self.file.as_ref().map_or(0, StorageFile::position);
        if position + self.buffer.len() as u64 + data.len() as u64 > MAX_FILE_SIZE {
            info!(file = %self.file_name, "log file at media size ceiling, rotating");
            self.close_file()?;
        }

        if data.len() > self.config.capacity {
            // record larger than the whole buffer: put the pending header
            // on the media first, then the record itself
            self.flush()?;
            self.buffer.clear();
            return self.write_all(data);
        }

        self.buffer.push_str(data);
        Ok(())
    }

    /// Writes the whole buffer to the media and syncs.
    ///
    /// Lazily creates the file on first use. The buffer is left intact;
    /// clearing it after a successful flush is the caller's step, so a
    /// failed flush loses nothing.
    pub fn flush(&mut self) -> Result<(), LogError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let buffer = mem::take(&mut self.buffer);
        let result = self.write_all(&buffer);
        self.buffer = buffer;
        result
    }

    fn write_all(&mut self, data: &str) -> Result<(), LogError> {
        if self.file.is_none() {
            self.create_file()?;
        }
        if let Some(file) = self.file.as_mut() {
            let written = file.write(data.as_bytes())?;
            if written != data.len() {
                return Err(StorageError::ShortWrite {
                    written,
                    expected: data.len(),
                }
                .into());
            }
            file.sync()?;
        }
        Ok(())
    }

    /// Flushes, closes the current file and restarts the buffer from the
    /// header, so the next file begins with a fresh header.
    pub fn close_file(&mut self) -> Result<(), LogError> {
        self.flush()?;
        if let Some(file) = self.file.take() {
            file.close()?;
        }
        self.buffer.clear();
        self.buffer.push_str(&self.config.header);
        Ok(())
    }

    /// Announces that the media is about to be removed.
    ///
    /// All buffered data is written out and the file closed; subsequent
    /// appends stay in memory until [`attach`] is called.
    ///
    /// [`attach`]: BufferedFileLogger::attach
    pub fn detach(&mut self) -> Result<(), LogError> {
        self.close_file()?;
        self.attached = false;
        info!("media detached, buffering in memory only");
        Ok(())
    }

    /// Announces that the media is back.
    ///
    /// The previous file is not reopened; the next append lazily creates a
    /// new file that starts with whatever survived the detached period
    /// (header first).
    pub fn attach(&mut self) {
        self.attached = true;
        info!("media attached, next append opens a new file");
    }
}
