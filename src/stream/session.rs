//! Stream session state machine
//!
//! ```text
//!   Idle ──switch──▶ Announcing ──launch ok──▶ Streaming
//!    ▲                   │                        │
//!    └───launch failed───┘                        │
//!    ▲                                            │
//!    └──────────────stop (quit / kill)────────────┘
//! ```
//!
//! A switch always runs stop → announce → launch, so the old player has
//! exited (or been killed) before the new one exists.

use std::time::Duration;

use crate::amplifier::AmplifierController;
use crate::channels::Channel;
use crate::error::ProcessError;
use crate::stream::{Announcer, PlaybackState, StreamLauncher};

pub struct StreamSession {
    launcher: Box<dyn StreamLauncher>,
    announcer: Box<dyn Announcer>,
    state: PlaybackState,
    quit_timeout: Duration,
    announce_volume: u8,
}

impl StreamSession {
    pub fn new(
        launcher: Box<dyn StreamLauncher>,
        announcer: Box<dyn Announcer>,
        quit_timeout: Duration,
        announce_volume: u8,
    ) -> Self {
        Self {
            launcher,
            announcer,
            state: PlaybackState::Idle,
            quit_timeout,
            announce_volume,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state.is_streaming()
    }

    /// Channel being announced or streamed
    pub fn current_channel(&self) -> Option<usize> {
        self.state.channel()
    }

    /// Stop the active player, if any
    ///
    /// Sends the quit instruction and waits for the bounded timeout; a player
    /// still alive afterwards is killed exactly once. Returns the channel that
    /// was playing.
    pub fn stop(&mut self) -> Option<usize> {
        match std::mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::Streaming(index, mut handle) => {
                let pid = handle.id();
                match handle.terminate(self.quit_timeout) {
                    Ok(()) => tracing::info!("Stopped stream {} (pid {})", index, pid),
                    Err(e) => {
                        tracing::warn!("Stream {} did not quit ({}), killing", index, e);
                        if let Err(e) = handle.force_kill() {
                            tracing::error!("Failed to kill pid {}: {}", pid, e);
                        }
                    }
                }
                Some(index)
            }
            PlaybackState::Announcing(index) => Some(index),
            PlaybackState::Idle => None,
        }
    }

    /// Switch playback to `channel`
    ///
    /// The amplifier is held at the announcement volume while the name is
    /// read out and then driven to `restore_level`. A failed announcement does
    /// not stop the switch; a failed launch leaves the session idle.
    pub fn switch_to(
        &mut self,
        index: usize,
        channel: &Channel,
        amplifier: &mut AmplifierController,
        restore_level: u8,
    ) -> Result<(), ProcessError> {
        self.stop();

        self.state = PlaybackState::Announcing(index);
        if let Err(e) = amplifier.set(self.announce_volume as i32) {
            tracing::warn!("Announcement volume not applied: {}", e);
        }
        tracing::info!("Announcing channel {}: {}", index, channel.name);
        if let Err(e) = self.announcer.announce(&channel.name) {
            tracing::warn!("Announcement failed: {}", e);
        }
        if let Err(e) = amplifier.set(restore_level as i32) {
            tracing::warn!("Playback volume not restored: {}", e);
        }

        match self.launcher.launch(channel) {
            Ok(handle) => {
                tracing::info!("Streaming {} (pid {})", channel.name, handle.id());
                self.state = PlaybackState::Streaming(index, handle);
                Ok(())
            }
            Err(e) => {
                self.state = PlaybackState::Idle;
                Err(e)
            }
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.stop();
    }
}
