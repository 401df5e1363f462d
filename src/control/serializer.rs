//! Command serializer
//!
//! The only place where volume, channel and playback state change. Commands
//! are applied one at a time in arrival order; a command's blocking work
//! (stopping a player, announcing, spawning) finishes before the next one is
//! taken from the queue. Edges arriving meanwhile wait in the queue.
//!
//! Once the input side reports it has stopped, channel changes still waiting
//! in the queue are skipped so teardown is not held up by announcements and
//! player launches nobody will hear.

use std::io;
use std::ops::ControlFlow;
use std::thread::{self, JoinHandle};

use crate::amplifier::AmplifierController;
use crate::channels::ChannelRegistry;
use crate::command::{Command, CommandReceiver};
use crate::control::shutdown::ShutdownSequencer;
use crate::control::volume::VolumeState;
use crate::persistence::StateStore;
use crate::stream::StreamSession;

/// Why the serializer loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// A `Shutdown` command was processed
    Shutdown,
    /// Every producer went away
    Disconnected,
}

/// Reports whether the input side is still delivering commands
pub trait InputGate: Send {
    fn is_open(&self) -> bool;
}

/// Read-only view of the controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioStatus {
    pub volume: u8,
    pub muted: bool,
    pub channel: usize,
    pub streaming: bool,
}

pub struct RadioController {
    registry: ChannelRegistry,
    amplifier: AmplifierController,
    session: StreamSession,
    store: Box<dyn StateStore>,
    shutdown: ShutdownSequencer,
    inputs: Option<Box<dyn InputGate>>,
    volume: VolumeState,
    channel: usize,
    finished: bool,
}

impl RadioController {
    pub fn new(
        registry: ChannelRegistry,
        amplifier: AmplifierController,
        session: StreamSession,
        store: Box<dyn StateStore>,
        shutdown: ShutdownSequencer,
    ) -> Self {
        Self {
            registry,
            amplifier,
            session,
            store,
            shutdown,
            inputs: None,
            volume: VolumeState::new(crate::constants::DEFAULT_VOLUME),
            channel: 0,
            finished: false,
        }
    }

    /// Skip queued channel changes once `gate` closes
    pub fn with_input_gate(mut self, gate: Box<dyn InputGate>) -> Self {
        self.inputs = Some(gate);
        self
    }

    /// Restore persisted state, then announce and play the current channel
    pub fn start(&mut self) {
        let persisted = self.store.load();

        self.volume = VolumeState::new(persisted.last_volume);
        if self.volume.level() != persisted.last_volume {
            tracing::warn!(
                "Persisted volume {} out of range, using {}",
                persisted.last_volume,
                self.volume.level()
            );
        }

        self.channel = if self.registry.contains(persisted.last_channel_index) {
            persisted.last_channel_index
        } else {
            tracing::warn!(
                "Persisted channel {} out of range ({} channels), using 0",
                persisted.last_channel_index,
                self.registry.len()
            );
            0
        };

        tracing::info!("Starting at volume {}, channel {}", self.volume.level(), self.channel);
        if let Err(e) = self.amplifier.set(self.volume.output() as i32) {
            tracing::warn!("Amplifier not reachable at boot: {}", e);
        }
        self.play_current();
    }

    /// Apply one command
    pub fn handle(&mut self, command: Command) -> ControlFlow<()> {
        if self.finished {
            tracing::debug!("Ignoring {} after shutdown", command);
            return ControlFlow::Break(());
        }
        tracing::debug!("Handling {}", command);

        match command {
            Command::VolumeStep(delta) => self.on_volume_step(delta),
            Command::Mute => self.on_mute(),
            Command::Next => self.on_channel_change(self.registry.next_index(self.channel)),
            Command::Previous => {
                self.on_channel_change(self.registry.previous_index(self.channel))
            }
            Command::Shutdown => self.on_shutdown(),
        }

        if command.is_terminal() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Drain the intake until shutdown or disconnect
    pub fn run(mut self, intake: CommandReceiver) -> ExitReason {
        while let Ok(command) = intake.recv() {
            if command.is_channel_change() && !self.inputs_open() {
                tracing::debug!("Inputs stopped, skipping queued {}", command);
                continue;
            }
            if self.handle(command).is_break() {
                let dropped = intake.try_iter().count();
                if dropped > 0 {
                    tracing::debug!("Discarded {} commands queued behind shutdown", dropped);
                }
                return ExitReason::Shutdown;
            }
        }

        tracing::info!("Command intake closed, stopping");
        self.shutdown.teardown(&mut self.session);
        self.finished = true;
        self.report_faults();
        ExitReason::Disconnected
    }

    /// Boot and run on a dedicated thread
    pub fn spawn(mut self, intake: CommandReceiver) -> io::Result<JoinHandle<ExitReason>> {
        thread::Builder::new()
            .name("command-serializer".into())
            .spawn(move || {
                self.start();
                self.run(intake)
            })
    }

    pub fn status(&self) -> RadioStatus {
        RadioStatus {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            channel: self.channel,
            streaming: self.session.is_streaming(),
        }
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    pub fn amplifier(&self) -> &AmplifierController {
        &self.amplifier
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn inputs_open(&self) -> bool {
        self.inputs.as_ref().map_or(true, |gate| gate.is_open())
    }

    fn report_faults(&self) {
        let faults = self.amplifier.faults();
        if faults > 0 {
            tracing::warn!("{} amplifier writes failed during this session", faults);
        }
    }

    fn on_volume_step(&mut self, delta: i8) {
        let change = self.volume.step(delta);
        if !change.changed() {
            tracing::debug!("Volume already at {}", change.level);
            return;
        }

        if self.volume.is_muted() {
            tracing::info!("Volume {} (muted)", change.level);
        } else {
            tracing::info!("Volume {}", change.level);
            if let Err(e) = self.amplifier.drive_to(change.level) {
                tracing::warn!("Volume not applied to amplifier: {}", e);
            }
        }

        if let Err(e) = self.store.save_volume(change.level) {
            tracing::warn!("Volume not persisted: {}", e);
        }
    }

    fn on_mute(&mut self) {
        let result = if self.volume.toggle_mute() {
            tracing::info!("Muted, volume {} on unmute", self.volume.pre_mute_level());
            self.amplifier.mute()
        } else {
            tracing::info!("Unmuted, volume {}", self.volume.level());
            self.amplifier.unmute(self.volume.level())
        };
        if let Err(e) = result {
            tracing::warn!("Mute state not applied to amplifier: {}", e);
        }
    }

    fn on_channel_change(&mut self, index: usize) {
        self.channel = index;
        self.play_current();

        if let Err(e) = self.store.save_channel(self.channel) {
            tracing::warn!("Channel not persisted: {}", e);
        }
    }

    fn play_current(&mut self) {
        let index = self.channel;
        let channel = match self.registry.get(index) {
            Some(channel) => channel,
            None => {
                tracing::error!("Channel {} missing from registry", index);
                return;
            }
        };

        if let Err(e) =
            self.session
                .switch_to(index, channel, &mut self.amplifier, self.volume.output())
        {
            tracing::error!("Failed to start {}: {}", channel.name, e);
        }
    }

    fn on_shutdown(&mut self) {
        self.finished = true;
        self.report_faults();
        if let Err(e) = self.shutdown.execute(&mut self.session) {
            tracing::error!("Halt request failed: {}", e);
        }
    }
}
