//! Raspberry Pi GPIO access
//!
//! Pins are claimed through `rppal` by BCM number as pulled-down inputs.
//! Rising edges are detected by the kernel and delivered on rppal's
//! interrupt threads, one per watched line, which hand them to the shared
//! [`InputDecoder`]. Edges that arrive while a callback is still running
//! are queued by the kernel rather than lost.

use parking_lot::Mutex;
use rppal::gpio::{Gpio, InputPin, Trigger};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::PinConfig;
use crate::control::{HardwareClaim, InputGate};
use crate::error::HardwareError;
use crate::input::decoder::{EdgeOutcome, InputDecoder};
use crate::input::line::{InputLine, LineReader};

/// Callback run for every rising edge on a watched line
pub type EdgeCallback = Box<dyn FnMut() + Send>;

/// Input lines that report rising edges as callbacks
pub trait EdgeSource: LineReader {
    /// Run `on_edge` for every rising edge on `line`
    fn watch(&self, line: InputLine, on_edge: EdgeCallback) -> Result<(), HardwareError>;

    /// Drop every registered callback and give the lines back
    fn release_lines(&self);
}

/// Front panel lines claimed through rppal
pub struct RpiGpio {
    pins: PinConfig,
    lines: HashMap<InputLine, Mutex<Option<InputPin>>>,
}

impl RpiGpio {
    /// Claim every configured pin as a pulled-down input
    pub fn open(pins: PinConfig) -> Result<Self, HardwareError> {
        let gpio = Gpio::new().map_err(|e| HardwareError::GpioUnavailable(e.to_string()))?;

        let mut lines = HashMap::with_capacity(InputLine::ALL.len());
        for line in InputLine::ALL {
            let pin = pins.pin(line);
            let input = gpio
                .get(pin)
                .map_err(|e| HardwareError::GpioSetup {
                    pin,
                    reason: e.to_string(),
                })?
                .into_input_pulldown();
            tracing::debug!("GPIO {} claimed for {}", pin, line);
            lines.insert(line, Mutex::new(Some(input)));
        }

        Ok(Self { pins, lines })
    }

    fn slot(&self, line: InputLine) -> Result<&Mutex<Option<InputPin>>, HardwareError> {
        self.lines
            .get(&line)
            .ok_or(HardwareError::LineUnavailable(line.name()))
    }
}

impl LineReader for RpiGpio {
    fn read(&self, line: InputLine) -> Result<bool, HardwareError> {
        let guard = self.slot(line)?.lock();
        let pin = guard
            .as_ref()
            .ok_or(HardwareError::LineUnavailable(line.name()))?;
        Ok(pin.is_high())
    }
}

impl EdgeSource for RpiGpio {
    fn watch(&self, line: InputLine, mut on_edge: EdgeCallback) -> Result<(), HardwareError> {
        let mut guard = self.slot(line)?.lock();
        let pin = guard
            .as_mut()
            .ok_or(HardwareError::LineUnavailable(line.name()))?;

        pin.set_async_interrupt(Trigger::RisingEdge, None, move |_event| on_edge())
            .map_err(|e| HardwareError::GpioSetup {
                pin: self.pins.pin(line),
                reason: e.to_string(),
            })
    }

    fn release_lines(&self) {
        // Dropping a pin joins its interrupt thread, which may be waiting on
        // a slot lock to sample a level, so pins are dropped unlocked.
        let released: Vec<InputPin> = self
            .lines
            .values()
            .filter_map(|slot| slot.lock().take())
            .collect();
        tracing::debug!("Released {} GPIO lines", released.len());
        drop(released);
    }
}

/// Stops edge delivery from outside the serializer
#[derive(Clone)]
pub struct MonitorStop {
    source: Arc<dyn EdgeSource>,
    running: Arc<AtomicBool>,
}

impl MonitorStop {
    /// Stop delivering edges and drop the decoder references held by the
    /// callbacks, closing the intake once no other sender is left
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.source.release_lines();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl InputGate for MonitorStop {
    fn is_open(&self) -> bool {
        self.is_running()
    }
}

/// Edge callbacks feeding the decoder, one per edge source
pub struct GpioMonitor {
    stop: MonitorStop,
}

impl GpioMonitor {
    /// Register a callback for every edge source
    pub fn start(
        source: Arc<dyn EdgeSource>,
        decoder: Arc<InputDecoder>,
    ) -> Result<Self, HardwareError> {
        let running = Arc::new(AtomicBool::new(true));
        let monitor = Self {
            stop: MonitorStop {
                source: source.clone(),
                running: running.clone(),
            },
        };

        for line in InputLine::EDGE_SOURCES {
            let decoder = decoder.clone();
            let running = running.clone();
            let on_edge: EdgeCallback = Box::new(move || {
                if !running.load(Ordering::Relaxed) {
                    return;
                }
                if decoder.on_rising_edge(line) == EdgeOutcome::Disconnected {
                    tracing::debug!("Command intake closed, ignoring {} edge", line);
                }
            });

            if let Err(e) = source.watch(line, on_edge) {
                monitor.stop();
                return Err(e);
            }
        }

        tracing::info!("Watching {} input lines", InputLine::EDGE_SOURCES.len());
        Ok(monitor)
    }

    pub fn stop_handle(&self) -> MonitorStop {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_running(&self) -> bool {
        self.stop.is_running()
    }
}

impl HardwareClaim for GpioMonitor {
    fn name(&self) -> &str {
        "gpio"
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.stop();
        Ok(())
    }
}

impl Drop for GpioMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
