//! Clamping wrapper over a [`VolumeDriver`]

use crate::amplifier::{StepDirection, VolumeDriver};
use crate::constants::{MAX_VOLUME, MIN_VOLUME};
use crate::error::HardwareError;

/// Clamp any signed level into the amplifier range
pub fn clamp_level(level: i32) -> u8 {
    level.clamp(MIN_VOLUME as i32, MAX_VOLUME as i32) as u8
}

pub struct AmplifierController {
    driver: Box<dyn VolumeDriver>,
    /// Level the amplifier is known to be at; `None` after a failed write
    output: Option<u8>,
    faults: u64,
}

impl AmplifierController {
    pub fn new(driver: Box<dyn VolumeDriver>) -> Self {
        Self {
            driver,
            output: None,
            faults: 0,
        }
    }

    /// Drive the amplifier to `level`, clamped to `[0, MAX_VOLUME]`
    pub fn set(&mut self, level: i32) -> Result<u8, HardwareError> {
        let level = clamp_level(level);
        let result = self.driver.set_absolute(level);
        self.record(result, level)
    }

    /// Move by `delta`, using relative commands when the driver has them
    pub fn step(&mut self, delta: i8) -> Result<u8, HardwareError> {
        let current = match self.output {
            Some(current) => current,
            None => return Err(HardwareError::LevelUnknown),
        };
        let target = clamp_level(current as i32 + delta as i32);
        if target == current {
            return Ok(current);
        }

        if self.driver.supports_step() && (target as i32 - current as i32).abs() == 1 {
            let direction = if target > current {
                StepDirection::Up
            } else {
                StepDirection::Down
            };
            let result = self.driver.step(direction);
            self.record(result, target)
        } else {
            self.set(target as i32)
        }
    }

    /// Silence the output
    pub fn mute(&mut self) -> Result<u8, HardwareError> {
        self.set(MIN_VOLUME as i32)
    }

    /// Restore the output to `level`
    pub fn unmute(&mut self, level: u8) -> Result<u8, HardwareError> {
        self.set(level as i32)
    }

    /// Bring the amplifier to `level` from wherever it is
    ///
    /// Single steps from a known level go through [`Self::step`]; anything
    /// else is an absolute write.
    pub fn drive_to(&mut self, level: u8) -> Result<u8, HardwareError> {
        match self.output {
            Some(current) if current == level => Ok(current),
            Some(current) if (level as i32 - current as i32).abs() == 1 => {
                self.step(level as i8 - current as i8)
            }
            _ => self.set(level as i32),
        }
    }

    pub fn output(&self) -> Option<u8> {
        self.output
    }

    /// Failed driver writes so far
    pub fn faults(&self) -> u64 {
        self.faults
    }

    fn record(&mut self, result: Result<(), HardwareError>, level: u8) -> Result<u8, HardwareError> {
        match result {
            Ok(()) => {
                self.output = Some(level);
                Ok(level)
            }
            Err(e) => {
                self.faults += 1;
                self.output = None;
                Err(e)
            }
        }
    }
}
