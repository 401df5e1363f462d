//! Stream playback subsystem
//!
//! At most one player process exists at any time. The session stops the
//! old process, announces the new channel and only then launches the next
//! player.

pub mod announce;
pub mod process;
pub mod session;

pub use announce::CommandAnnouncer;
pub use process::{PlayerLauncher, PlayerProcess};
pub use session::StreamSession;

use std::fmt;
use std::time::Duration;

use crate::channels::Channel;
use crate::error::ProcessError;

/// A running stream player
pub trait StreamHandle: Send {
    /// OS process id, for logging
    fn id(&self) -> u32;

    /// Ask the player to quit and wait up to `timeout` for it to exit
    ///
    /// Returns [`ProcessError::TerminateTimeout`] if it is still running.
    fn terminate(&mut self, timeout: Duration) -> Result<(), ProcessError>;

    /// Kill the player and reap it
    fn force_kill(&mut self) -> Result<(), ProcessError>;
}

/// Starts stream players
pub trait StreamLauncher: Send {
    fn launch(&mut self, channel: &Channel) -> Result<Box<dyn StreamHandle>, ProcessError>;
}

/// Reads text out loud, blocking until done
pub trait Announcer: Send {
    fn announce(&mut self, text: &str) -> Result<(), ProcessError>;
}

/// Playback lifecycle
pub enum PlaybackState {
    Idle,
    /// Channel name being read out; no player running
    Announcing(usize),
    Streaming(usize, Box<dyn StreamHandle>),
}

impl PlaybackState {
    pub fn channel(&self) -> Option<usize> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Announcing(index) | PlaybackState::Streaming(index, _) => Some(*index),
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, PlaybackState::Streaming(..))
    }
}

impl fmt::Debug for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => f.write_str("Idle"),
            PlaybackState::Announcing(index) => f.debug_tuple("Announcing").field(index).finish(),
            PlaybackState::Streaming(index, handle) => f
                .debug_struct("Streaming")
                .field("channel", index)
                .field("pid", &handle.id())
                .finish(),
        }
    }
}
