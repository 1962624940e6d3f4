//! Persistence of the last accepted prediction time
//!
//! Only one scalar survives a restart. The file holds Unix seconds as a
//! decimal number (`1718000000.25`); `0` or an empty file means "never".

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to access timestamp file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Storage for the cooldown gate's last prediction time
pub trait TimestampStore: Send {
    fn load(&self) -> Result<Option<DateTime<Utc>>>;
    fn save(&self, at: DateTime<Utc>) -> Result<()>;
}

/// Timestamp kept in a small text file
pub struct FileTimestampStore {
    path: PathBuf,
}

impl FileTimestampStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimestampStore for FileTimestampStore {
    fn load(&self) -> Result<Option<DateTime<Utc>>> {
        if !self.path.exists() {
            debug!("Timestamp file {:?} not found, no previous prediction", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        parse_timestamp(&content)
    }

    fn save(&self, at: DateTime<Utc>) -> Result<()> {
        fs::write(&self.path, format_timestamp(at))?;
        debug!("Saved last prediction time {} to {:?}", at, self.path);
        Ok(())
    }
}

/// In-process store, for tests and for running without a writable disk
#[derive(Default)]
pub struct MemoryTimestampStore {
    value: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryTimestampStore {
    pub fn new(initial: Option<DateTime<Utc>>) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

impl TimestampStore for MemoryTimestampStore {
    fn load(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(*self.value.lock())
    }

    fn save(&self, at: DateTime<Utc>) -> Result<()> {
        *self.value.lock() = Some(at);
        Ok(())
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    let micros = at.timestamp_micros();
    format!("{}.{:06}", micros.div_euclid(1_000_000), micros.rem_euclid(1_000_000))
}

fn parse_timestamp(content: &str) -> Result<Option<DateTime<Utc>>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let secs: f64 = trimmed
        .parse()
        .map_err(|_| PersistenceError::InvalidValue(trimmed.to_string()))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(PersistenceError::InvalidValue(trimmed.to_string()));
    }
    if secs == 0.0 {
        return Ok(None);
    }

    let micros = (secs * 1_000_000.0).round() as i64;
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(Some)
        .ok_or_else(|| PersistenceError::InvalidValue(trimmed.to_string()))
}
