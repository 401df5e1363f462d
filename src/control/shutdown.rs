//! Orderly halt: stop the stream, release hardware, power off

use std::process::{Command, Stdio};

use crate::config::PowerConfig;
use crate::error::{HardwareError, ProcessError};
use crate::stream::StreamSession;

/// A hardware resource that must be handed back before power-off
pub trait HardwareClaim: Send {
    fn name(&self) -> &str;
    fn release(&mut self) -> Result<(), HardwareError>;
}

/// Host power control
pub trait PowerControl: Send {
    /// Request an immediate halt
    fn halt(&mut self) -> Result<(), ProcessError>;
}

/// Runs the configured halt command (`sudo shutdown -h now` by default)
pub struct CommandPower {
    program: String,
    args: Vec<String>,
}

impl CommandPower {
    pub fn new(config: &PowerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl PowerControl for CommandPower {
    fn halt(&mut self) -> Result<(), ProcessError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| ProcessError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::ExitStatus {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

pub struct ShutdownSequencer {
    claims: Vec<Box<dyn HardwareClaim>>,
    power: Box<dyn PowerControl>,
}

impl ShutdownSequencer {
    pub fn new(power: Box<dyn PowerControl>) -> Self {
        Self {
            claims: Vec::new(),
            power,
        }
    }

    /// Register a resource to release on shutdown
    pub fn claim(&mut self, claim: Box<dyn HardwareClaim>) {
        self.claims.push(claim);
    }

    /// Release every registered claim; failures are logged
    pub fn release_hardware(&mut self) {
        for mut claim in self.claims.drain(..) {
            match claim.release() {
                Ok(()) => tracing::debug!("Released {}", claim.name()),
                Err(e) => tracing::warn!("Failed to release {}: {}", claim.name(), e),
            }
        }
    }

    /// Stop playback and release hardware without powering off
    pub fn teardown(&mut self, session: &mut StreamSession) {
        session.stop();
        self.release_hardware();
    }

    /// Stop playback, release hardware, halt the host
    pub fn execute(&mut self, session: &mut StreamSession) -> Result<(), ProcessError> {
        tracing::info!("Shutting down radio");
        self.teardown(session);
        self.power.halt()
    }
}
