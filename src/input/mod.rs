//! Input subsystem: edge decoding and debouncing

pub mod debounce;
pub mod decoder;
#[cfg(feature = "gpio")]
pub mod gpio;
pub mod line;
pub mod rotary;

pub use debounce::Debouncer;
pub use decoder::{EdgeOutcome, InputDecoder};
#[cfg(feature = "gpio")]
pub use gpio::{EdgeCallback, EdgeSource, GpioMonitor, MonitorStop, RpiGpio};
pub use line::{InputLine, LineReader};
pub use rotary::{decode_quadrature, RotaryDecoder};
