//! Amplifier volume control
//!
//! The controller clamps and tracks levels; drivers only move bytes.

pub mod controller;
pub mod max9744;

pub use controller::AmplifierController;
pub use max9744::Max9744;

use crate::error::HardwareError;

/// Direction of a relative volume step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Low-level volume driver
pub trait VolumeDriver: Send {
    /// Drive the amplifier to an absolute level in `0..=MAX_VOLUME`
    fn set_absolute(&mut self, level: u8) -> Result<(), HardwareError>;

    /// Whether [`VolumeDriver::step`] is implemented
    fn supports_step(&self) -> bool {
        false
    }

    /// Move the amplifier one step
    fn step(&mut self, _direction: StepDirection) -> Result<(), HardwareError> {
        Err(HardwareError::StepUnsupported)
    }
}
