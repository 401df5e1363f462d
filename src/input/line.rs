//! Monitored input lines

use std::fmt;

use crate::command::Command;
use crate::error::HardwareError;

/// A digital input wired to the front panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputLine {
    /// Rotary encoder channel A (edge source)
    RotaryA,
    /// Rotary encoder channel B (sampled only)
    RotaryB,
    /// Encoder push switch
    Mute,
    Next,
    Previous,
    Power,
}

impl InputLine {
    pub const ALL: [InputLine; 6] = [
        InputLine::RotaryA,
        InputLine::RotaryB,
        InputLine::Mute,
        InputLine::Next,
        InputLine::Previous,
        InputLine::Power,
    ];

    /// Lines whose rising edges produce commands
    pub const EDGE_SOURCES: [InputLine; 5] = [
        InputLine::RotaryA,
        InputLine::Mute,
        InputLine::Next,
        InputLine::Previous,
        InputLine::Power,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InputLine::RotaryA => "rotary-a",
            InputLine::RotaryB => "rotary-b",
            InputLine::Mute => "mute-switch",
            InputLine::Next => "next-button",
            InputLine::Previous => "previous-button",
            InputLine::Power => "power-button",
        }
    }

    /// Command emitted by a discrete button, `None` for the encoder lines
    pub fn button_command(&self) -> Option<Command> {
        match self {
            InputLine::Mute => Some(Command::Mute),
            InputLine::Next => Some(Command::Next),
            InputLine::Previous => Some(Command::Previous),
            InputLine::Power => Some(Command::Shutdown),
            InputLine::RotaryA | InputLine::RotaryB => None,
        }
    }

    pub fn is_button(&self) -> bool {
        self.button_command().is_some()
    }
}

impl fmt::Display for InputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reads the current level of an input line
pub trait LineReader: Send + Sync {
    fn read(&self, line: InputLine) -> Result<bool, HardwareError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert_eq!(InputLine::Power.button_command(), Some(Command::Shutdown));
        assert_eq!(InputLine::Mute.button_command(), Some(Command::Mute));
        assert!(!InputLine::RotaryA.is_button());
        assert!(!InputLine::RotaryB.is_button());
    }

    #[test]
    fn test_rotary_b_is_not_an_edge_source() {
        assert!(!InputLine::EDGE_SOURCES.contains(&InputLine::RotaryB));
        assert_eq!(InputLine::ALL.len(), InputLine::EDGE_SOURCES.len() + 1);
    }
}
