//! Edge-to-command decoding
//!
//! One decoder is shared by every edge source. Handlers only decode and hand
//! off; they never touch playback or volume state and never wait on the
//! serializer.

use crossbeam_channel::TrySendError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::command::{Command, CommandSender};
use crate::input::debounce::Debouncer;
use crate::input::line::{InputLine, LineReader};
use crate::input::rotary::RotaryDecoder;

/// Result of handling one rising edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// A command was queued for the serializer
    Emitted(Command),
    /// Noise, debounce or a line that emits nothing
    Ignored,
    /// Intake full; the command was dropped
    Dropped(Command),
    /// The serializer is gone; the edge source should stop
    Disconnected,
}

pub struct InputDecoder {
    reader: Arc<dyn LineReader>,
    rotary: RotaryDecoder,
    buttons: HashMap<InputLine, Debouncer>,
    intake: CommandSender,
}

impl InputDecoder {
    pub fn new(
        reader: Arc<dyn LineReader>,
        rotary_settle: Duration,
        button_window: Duration,
        intake: CommandSender,
    ) -> Self {
        let buttons = InputLine::ALL
            .iter()
            .filter(|line| line.is_button())
            .map(|line| (*line, Debouncer::new(button_window)))
            .collect();

        Self {
            reader,
            rotary: RotaryDecoder::new(rotary_settle),
            buttons,
            intake,
        }
    }

    /// Decode a rising edge observed now
    pub fn decode(&self, line: InputLine) -> Option<Command> {
        self.decode_at(line, Instant::now())
    }

    /// Decode a rising edge observed at `now`
    pub fn decode_at(&self, line: InputLine, now: Instant) -> Option<Command> {
        match line {
            InputLine::RotaryA => self.rotary.sample(self.reader.as_ref()),
            InputLine::RotaryB => None,
            _ => {
                let debouncer = self.buttons.get(&line)?;
                if debouncer.accept_at(now) {
                    line.button_command()
                } else {
                    tracing::debug!("{} edge inside refractory window, dropped", line);
                    None
                }
            }
        }
    }

    /// Decode a rising edge and queue the resulting command
    pub fn on_rising_edge(&self, line: InputLine) -> EdgeOutcome {
        match self.decode(line) {
            Some(command) => self.submit(command),
            None => EdgeOutcome::Ignored,
        }
    }

    fn submit(&self, command: Command) -> EdgeOutcome {
        match self.intake.try_send(command) {
            Ok(()) => {
                tracing::debug!("Queued {}", command);
                EdgeOutcome::Emitted(command)
            }
            Err(TrySendError::Full(command)) => {
                tracing::warn!("Command queue full, dropping {}", command);
                EdgeOutcome::Dropped(command)
            }
            Err(TrySendError::Disconnected(_)) => EdgeOutcome::Disconnected,
        }
    }
}
