//! Commands exchanged between the input side and the serializer

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;

use crate::constants::COMMAND_QUEUE_CAPACITY;

/// A decoded user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Relative volume change, `+1` or `-1` from the encoder
    VolumeStep(i8),
    /// Toggle mute
    Mute,
    /// Next channel
    Next,
    /// Previous channel
    Previous,
    /// Stop everything and halt the host
    Shutdown,
}

impl Command {
    /// `Next` or `Previous`
    pub fn is_channel_change(&self) -> bool {
        matches!(self, Command::Next | Command::Previous)
    }

    /// Ends the serializer loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, Command::Shutdown)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::VolumeStep(d) if *d >= 0 => write!(f, "volume +{}", d),
            Command::VolumeStep(d) => write!(f, "volume {}", d),
            Command::Mute => f.write_str("mute"),
            Command::Next => f.write_str("next"),
            Command::Previous => f.write_str("previous"),
            Command::Shutdown => f.write_str("shutdown"),
        }
    }
}

pub type CommandSender = Sender<Command>;
pub type CommandReceiver = Receiver<Command>;

/// Create the serializer intake
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    bounded(COMMAND_QUEUE_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_changes() {
        assert!(Command::Next.is_channel_change());
        assert!(Command::Previous.is_channel_change());
        assert!(!Command::Mute.is_channel_change());
        assert!(!Command::VolumeStep(1).is_channel_change());
    }

    #[test]
    fn test_intake_is_fifo() {
        let (tx, rx) = command_channel();
        tx.try_send(Command::Next).unwrap();
        tx.try_send(Command::VolumeStep(-1)).unwrap();
        tx.try_send(Command::Shutdown).unwrap();

        assert_eq!(rx.recv().unwrap(), Command::Next);
        assert_eq!(rx.recv().unwrap(), Command::VolumeStep(-1));
        assert!(rx.recv().unwrap().is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::VolumeStep(1).to_string(), "volume +1");
        assert_eq!(Command::VolumeStep(-1).to_string(), "volume -1");
        assert_eq!(Command::Shutdown.to_string(), "shutdown");
    }
}
