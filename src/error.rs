//! Error types for the radio controller

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Amplifier and GPIO faults
#[derive(Error, Debug)]
pub enum HardwareError {
    #[error("I2C bus {bus} unavailable: {reason}")]
    I2cBus { bus: u8, reason: String },

    #[error("I2C write of {byte:#04x} to {address:#04x} failed: {reason}")]
    I2cWrite { address: u8, byte: u8, reason: String },

    #[error("Relative volume step not supported by driver")]
    StepUnsupported,

    #[error("Amplifier level unknown after a failed write")]
    LevelUnknown,

    #[error("GPIO controller unavailable: {0}")]
    GpioUnavailable(String),

    #[error("GPIO {pin} setup failed: {reason}")]
    GpioSetup { pin: u8, reason: String },

    #[error("Line {0} is not wired")]
    LineUnavailable(&'static str),
}

/// Stream player and announcer process faults
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process {pid} did not exit within {timeout_ms} ms")]
    TerminateTimeout { pid: u32, timeout_ms: u64 },

    #[error("Failed to kill process {pid}: {source}")]
    KillFailed {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: String },

    #[error("Process IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// State file faults
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unparsable value {value:?} in {path}")]
    Parse { path: PathBuf, value: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration faults
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Channel list is empty")]
    NoChannels,

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;
