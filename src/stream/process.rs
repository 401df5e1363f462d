//! External player processes
//!
//! Players are started with a piped stdin. Quitting writes the configured
//! quit sequence (omxplayer uses `q`) and polls for exit until the timeout.

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::channels::Channel;
use crate::config::PlayerConfig;
use crate::error::ProcessError;
use crate::stream::{StreamHandle, StreamLauncher};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns the configured player with the channel URL as last argument
pub struct PlayerLauncher {
    program: String,
    args: Vec<String>,
    quit_sequence: Vec<u8>,
}

impl PlayerLauncher {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            quit_sequence: config.quit_sequence.as_bytes().to_vec(),
        }
    }
}

impl StreamLauncher for PlayerLauncher {
    fn launch(&mut self, channel: &Channel) -> Result<Box<dyn StreamHandle>, ProcessError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(channel.url.trim())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!("Spawned {} (pid {}) for {}", self.program, child.id(), channel.url);
        Ok(Box::new(PlayerProcess::new(child, self.quit_sequence.clone())))
    }
}

/// A spawned player; killed on drop if still running
pub struct PlayerProcess {
    child: Child,
    quit_sequence: Vec<u8>,
    reaped: bool,
}

impl PlayerProcess {
    pub fn new(child: Child, quit_sequence: Vec<u8>) -> Self {
        Self {
            child,
            quit_sequence,
            reaped: false,
        }
    }

    fn send_quit(&mut self) {
        if let Some(stdin) = self.child.stdin.as_mut() {
            let sent = stdin
                .write_all(&self.quit_sequence)
                .and_then(|_| stdin.flush());
            if let Err(e) = sent {
                // Broken pipe: the player is already gone
                tracing::debug!("Quit sequence not delivered to {}: {}", self.child.id(), e);
            }
        }
    }

    fn has_exited(&mut self) -> Result<bool, ProcessError> {
        if self.reaped {
            return Ok(true);
        }
        let exited = self.child.try_wait()?.is_some();
        self.reaped = exited;
        Ok(exited)
    }
}

impl StreamHandle for PlayerProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn terminate(&mut self, timeout: Duration) -> Result<(), ProcessError> {
        if self.has_exited()? {
            return Ok(());
        }
        self.send_quit();

        let deadline = Instant::now() + timeout;
        loop {
            if self.has_exited()? {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ProcessError::TerminateTimeout {
                    pid: self.child.id(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            thread::sleep(EXIT_POLL_INTERVAL.min(deadline - now));
        }
    }

    fn force_kill(&mut self) -> Result<(), ProcessError> {
        if self.has_exited()? {
            return Ok(());
        }
        let pid = self.child.id();
        self.child
            .kill()
            .map_err(|source| ProcessError::KillFailed { pid, source })?;
        self.child.wait()?;
        self.reaped = true;
        Ok(())
    }
}

impl Drop for PlayerProcess {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
