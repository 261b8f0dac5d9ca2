//! Diagnostics sinks for lookup failures.
//!
//! Each lookup failure or warning is recorded here as one line. Successful lookups record
//! nothing.

use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Local};

/// Destination for diagnostic messages.
///
/// Implementations are shared by all batch workers and must tolerate concurrent calls.
pub trait Diagnostics: Send + Sync {
    /// Records one diagnostic message.
    ///
    /// `message` does not contain a timestamp or a trailing newline.
    fn record(&self, message: &str);
}

/// Formats a diagnostic line as `[YYYY-MM-DD HH:MM:SS] message`.
pub fn format_line(at: &DateTime<Local>, message: &str) -> String {
    format!("[{}] {}", at.format("%Y-%m-%d %H:%M:%S"), message)
}

/// Appends timestamped lines to a file.
///
/// The file is opened lazily on the first recorded message, so a resolver that never fails never
/// creates it.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match guard.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?,
        };
        let file = guard.insert(file);
        // One `write_all` per line so concurrent writers cannot interleave within a line.
        file.write_all(format!("{}\n", line).as_bytes())?;
        file.flush()
    }
}

impl Diagnostics for FileSink {
    fn record(&self, message: &str) {
        let line = format_line(&Local::now(), message);
        if let Err(e) = self.append(&line) {
            log::warn!("failed to write to {}: {}", self.path.display(), e);
        }
    }
}

impl fmt::Debug for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Collects messages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every message recorded so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Diagnostics for MemorySink {
    fn record(&self, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
