//! Rotary encoder decoding
//!
//! Triggered by a rising edge on line A. After a short settle delay both
//! lines are sampled:
//!
//! | A | B | result            |
//! |---|---|-------------------|
//! | 1 | 0 | `VolumeStep(+1)`  |
//! | 1 | 1 | `VolumeStep(-1)`  |
//! | 0 | x | noise, discarded  |

use std::thread;
use std::time::Duration;

use crate::command::Command;
use crate::input::line::{InputLine, LineReader};

/// Map a sampled (A, B) pair to a volume step
pub fn decode_quadrature(a: bool, b: bool) -> Option<Command> {
    match (a, b) {
        (true, false) => Some(Command::VolumeStep(1)),
        (true, true) => Some(Command::VolumeStep(-1)),
        _ => None,
    }
}

pub struct RotaryDecoder {
    settle: Duration,
}

impl RotaryDecoder {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    /// Wait out contact bounce, then sample both lines
    pub fn sample(&self, reader: &dyn LineReader) -> Option<Command> {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }

        let levels = reader
            .read(InputLine::RotaryA)
            .and_then(|a| reader.read(InputLine::RotaryB).map(|b| (a, b)));

        match levels {
            Ok((a, b)) => {
                let command = decode_quadrature(a, b);
                if command.is_none() {
                    tracing::trace!("Rotary noise discarded (A={}, B={})", a as u8, b as u8);
                }
                command
            }
            Err(e) => {
                tracing::warn!("Rotary sample failed: {}", e);
                None
            }
        }
    }
}
