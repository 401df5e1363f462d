//! Last volume and channel, kept across power cycles
//!
//! Each value lives in its own file as a decimal integer followed by a
//! newline. A missing or unparsable file falls back to that value's default
//! without affecting the other one. A volume outside the amplifier range is
//! clamped into it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::amplifier::controller::clamp_level;
use crate::constants::DEFAULT_VOLUME;
use crate::error::PersistenceError;

pub const VOLUME_FILE: &str = "last_volume";
pub const CHANNEL_FILE: &str = "last_channel_index";

/// Values restored at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedState {
    pub last_volume: u8,
    pub last_channel_index: usize,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            last_volume: DEFAULT_VOLUME,
            last_channel_index: 0,
        }
    }
}

/// Durable storage for the two persisted values
pub trait StateStore: Send {
    /// Read both values; never fails, absent fields take their defaults
    fn load(&self) -> PersistedState;

    fn save_volume(&mut self, volume: u8) -> Result<(), PersistenceError>;

    fn save_channel(&mut self, index: usize) -> Result<(), PersistenceError>;

    /// Overwrite both values
    fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError> {
        self.save_volume(state.last_volume)?;
        self.save_channel(state.last_channel_index)
    }
}

/// One file per value inside a directory
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_volume(&self) -> Result<u8, PersistenceError> {
        let raw = self.read_value::<i64>(VOLUME_FILE)?;
        let level = clamp_level(raw.clamp(i32::MIN.into(), i32::MAX.into()) as i32);
        if i64::from(level) != raw {
            tracing::warn!("Persisted volume {} out of range, clamped to {}", raw, level);
        }
        Ok(level)
    }

    fn read_value<T: std::str::FromStr>(&self, name: &str) -> Result<T, PersistenceError> {
        let path = self.dir.join(name);
        let text = fs::read_to_string(&path).map_err(|source| PersistenceError::Read {
            path: path.clone(),
            source,
        })?;
        text.trim().parse().map_err(|_| PersistenceError::Parse {
            path,
            value: text.trim().to_string(),
        })
    }

    fn write_value(&self, name: &str, value: impl std::fmt::Display) -> Result<(), PersistenceError> {
        let path = self.dir.join(name);
        let write_err = |source| PersistenceError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        // Rename over the old file so a power cut never leaves it half written
        let tmp = self.dir.join(format!(".{}.tmp", name));
        fs::write(&tmp, format!("{}\n", value)).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> PersistedState {
        let defaults = PersistedState::default();

        let last_volume = self.read_volume().unwrap_or_else(|e| {
            tracing::info!("Using default volume {}: {}", defaults.last_volume, e);
            defaults.last_volume
        });
        let last_channel_index = self.read_value::<usize>(CHANNEL_FILE).unwrap_or_else(|e| {
            tracing::info!("Using default channel {}: {}", defaults.last_channel_index, e);
            defaults.last_channel_index
        });

        PersistedState {
            last_volume,
            last_channel_index,
        }
    }

    fn save_volume(&mut self, volume: u8) -> Result<(), PersistenceError> {
        self.write_value(VOLUME_FILE, volume)
    }

    fn save_channel(&mut self, index: usize) -> Result<(), PersistenceError> {
        self.write_value(CHANNEL_FILE, index)
    }
}
