//! Application configuration
//!
//! Loaded from a TOML file. Every section has defaults matching the
//! reference hardware (Raspberry Pi, MAX9744 amplifier, omxplayer, festival),
//! so an empty file or no file at all yields a working setup.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::channels::{default_channels, Channel};
use crate::constants::*;
use crate::error::ConfigError;
use crate::input::InputLine;

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "radio.toml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub amplifier: AmplifierConfig,
    pub player: PlayerConfig,
    pub announcer: AnnouncerConfig,
    pub power: PowerConfig,
    pub state: StateConfig,
    pub channels: Vec<Channel>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            amplifier: AmplifierConfig::default(),
            player: PlayerConfig::default(),
            announcer: AnnouncerConfig::default(),
            power: PowerConfig::default(),
            state: StateConfig::default(),
            channels: default_channels(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else the platform config file if it
    /// exists, else defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/radio.toml`
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        if let Some(channel) = self.channels.iter().find(|c| c.url.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "channels.url",
                reason: format!("channel {:?} has no stream URL", channel.name),
            });
        }
        if self.amplifier.announce_volume > MAX_VOLUME {
            return Err(ConfigError::Invalid {
                field: "amplifier.announce_volume",
                reason: format!("{} exceeds {}", self.amplifier.announce_volume, MAX_VOLUME),
            });
        }
        if self.amplifier.address > 0x7F {
            return Err(ConfigError::Invalid {
                field: "amplifier.address",
                reason: format!("{:#x} is not a 7-bit I2C address", self.amplifier.address),
            });
        }
        let pins = InputLine::ALL.map(|line| self.input.pins.pin(line));
        let duplicate = (1..pins.len()).find(|&i| pins[..i].contains(&pins[i]));
        if let Some(i) = duplicate {
            return Err(ConfigError::Invalid {
                field: "input.pins",
                reason: format!("GPIO {} assigned to more than one line", pins[i]),
            });
        }
        if self.player.program.is_empty() {
            return Err(ConfigError::Invalid {
                field: "player.program",
                reason: "empty".into(),
            });
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "radio-control")
}

/// GPIO lines and timing of the input side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub pins: PinConfig,
    pub rotary_settle_ms: u64,
    pub button_debounce_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pins: PinConfig::default(),
            rotary_settle_ms: ROTARY_SETTLE_MS,
            button_debounce_ms: BUTTON_DEBOUNCE_MS,
        }
    }
}

impl InputConfig {
    pub fn rotary_settle(&self) -> Duration {
        Duration::from_millis(self.rotary_settle_ms)
    }

    pub fn button_debounce(&self) -> Duration {
        Duration::from_millis(self.button_debounce_ms)
    }
}

/// BCM pin numbers of each monitored line
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub rotary_a: u8,
    pub rotary_b: u8,
    pub mute: u8,
    pub next: u8,
    pub previous: u8,
    pub power: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            rotary_a: 5,
            rotary_b: 6,
            mute: 19,
            next: 4,
            previous: 17,
            power: 27,
        }
    }
}

impl PinConfig {
    pub fn pin(&self, line: InputLine) -> u8 {
        match line {
            InputLine::RotaryA => self.rotary_a,
            InputLine::RotaryB => self.rotary_b,
            InputLine::Mute => self.mute,
            InputLine::Next => self.next,
            InputLine::Previous => self.previous,
            InputLine::Power => self.power,
        }
    }
}

/// MAX9744 amplifier on I2C
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmplifierConfig {
    /// I2C bus number, `/dev/i2c-<bus>`
    pub bus: u8,
    pub address: u8,
    /// Level used while a channel name is read out
    pub announce_volume: u8,
    /// Use the chip's increment/decrement commands for single steps
    pub step_commands: bool,
}

impl Default for AmplifierConfig {
    fn default() -> Self {
        Self {
            bus: 1,
            address: 0x4B,
            announce_volume: ANNOUNCE_VOLUME,
            step_commands: true,
        }
    }
}

/// Stream player process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub program: String,
    /// Arguments placed before the stream URL
    pub args: Vec<String>,
    /// Bytes written to the player's stdin to make it quit
    pub quit_sequence: String,
    pub quit_timeout_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: "omxplayer".into(),
            args: vec!["-o".into(), "local".into()],
            quit_sequence: "q".into(),
            quit_timeout_ms: STREAM_QUIT_TIMEOUT_MS,
        }
    }
}

impl PlayerConfig {
    pub fn quit_timeout(&self) -> Duration {
        Duration::from_millis(self.quit_timeout_ms)
    }
}

/// Text-to-speech program; the text is written to its stdin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            program: "festival".into(),
            args: vec!["--tts".into()],
        }
    }
}

/// Host halt command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            program: "sudo".into(),
            args: vec!["shutdown".into(), "-h".into(), "now".into()],
        }
    }
}

/// Where the last volume and channel are kept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub dir: Option<PathBuf>,
}

impl StateConfig {
    /// Configured directory, else the platform data dir, else the
    /// working directory
    pub fn resolve_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
