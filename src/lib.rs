//! # Radio Control
//!
//! Control loop for a button and rotary-encoder driven internet radio.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                           INPUT SIDE                                 │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐    │
//! │  │ Rotary A │ │   Mute   │ │   Next   │ │ Previous │ │  Power   │    │
//! │  │   IRQ    │ │   IRQ    │ │   IRQ    │ │   IRQ    │ │   IRQ    │    │
//! │  └────┬─────┘ └────┬─────┘ └────┬─────┘ └────┬─────┘ └────┬─────┘    │
//! │       │ settle 2ms │ refractory window (per line)          │         │
//! │       ▼            ▼            ▼            ▼             ▼         │
//! │  ┌───────────────────────────────────────────────────────────────┐   │
//! │  │             InputDecoder (input::decoder) - Sync              │   │
//! │  │   VolumeStep(±1) | Mute | Next | Previous | Shutdown          │   │
//! │  └───────────────────────────────┬───────────────────────────────┘   │
//! └──────────────────────────────────┼───────────────────────────────────┘
//!                                    │ crossbeam channel (FIFO, try_send)
//!                                    ▼
//! ┌──────────────────────────────────┼───────────────────────────────────┐
//! │               COMMAND SERIALIZER THREAD (control)                    │
//! │  ┌───────────────────────────────────────────────────────────────┐   │
//! │  │  owns: VolumeState, channel index, StreamSession              │   │
//! │  └───────┬───────────────┬───────────────┬───────────────┬───────┘   │
//! │          ▼               ▼               ▼               ▼           │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────┐ ┌─────────────┐     │
//! │  │  Amplifier  │ │  Channel    │ │  Stream     │ │ StateStore  │     │
//! │  │ (MAX9744)   │ │  Registry   │ │  Session    │ │ (2 files)   │     │
//! │  └─────────────┘ └─────────────┘ └──────┬──────┘ └─────────────┘     │
//! │                                         ▼                            │
//! │                          stop → announce → launch player             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

pub mod amplifier;
pub mod channels;
pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod input;
pub mod persistence;
pub mod stream;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Highest level accepted by the amplifier
    pub const MAX_VOLUME: u8 = 63;

    /// Amplifier level when muted
    pub const MIN_VOLUME: u8 = 0;

    /// Volume used when nothing was persisted
    pub const DEFAULT_VOLUME: u8 = 32;

    /// Fixed level used while a channel name is announced
    pub const ANNOUNCE_VOLUME: u8 = 55;

    /// Delay between a rotary edge and sampling both lines
    pub const ROTARY_SETTLE_MS: u64 = 2;

    /// Refractory window for discrete buttons
    pub const BUTTON_DEBOUNCE_MS: u64 = 2000;

    /// How long a player gets to exit after the quit instruction
    pub const STREAM_QUIT_TIMEOUT_MS: u64 = 500;

    /// Capacity of the command intake
    pub const COMMAND_QUEUE_CAPACITY: usize = 64;
}
