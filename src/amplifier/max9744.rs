//! MAX9744 class-D amplifier
//!
//! The chip takes a single byte over I2C: `0..=63` sets the volume,
//! `0xC4`/`0xC5` step it up/down. Any `embedded-hal` I2C bus can carry it;
//! on the Pi that is `rppal::i2c::I2c`.

use embedded_hal::i2c::I2c;

use crate::amplifier::{StepDirection, VolumeDriver};
use crate::config::AmplifierConfig;
use crate::constants::MAX_VOLUME;
use crate::error::HardwareError;

const CMD_VOLUME_UP: u8 = 0xC4;
const CMD_VOLUME_DOWN: u8 = 0xC5;

pub struct Max9744<I2C> {
    i2c: I2C,
    address: u8,
    step_commands: bool,
}

impl<I2C: I2c> Max9744<I2C> {
    pub fn new(i2c: I2C, config: &AmplifierConfig) -> Self {
        Self {
            i2c,
            address: config.address,
            step_commands: config.step_commands,
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), HardwareError> {
        self.i2c
            .write(self.address, &[byte])
            .map_err(|e| HardwareError::I2cWrite {
                address: self.address,
                byte,
                reason: format!("{:?}", e),
            })?;
        tracing::trace!("I2C {:#04x} <- {:#04x}", self.address, byte);
        Ok(())
    }
}

impl<I2C: I2c + Send> VolumeDriver for Max9744<I2C> {
    fn set_absolute(&mut self, level: u8) -> Result<(), HardwareError> {
        self.write_byte(level.min(MAX_VOLUME))
    }

    fn supports_step(&self) -> bool {
        self.step_commands
    }

    fn step(&mut self, direction: StepDirection) -> Result<(), HardwareError> {
        if !self.step_commands {
            return Err(HardwareError::StepUnsupported);
        }
        match direction {
            StepDirection::Up => self.write_byte(CMD_VOLUME_UP),
            StepDirection::Down => self.write_byte(CMD_VOLUME_DOWN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    /// Records every write as (address, bytes)
    #[derive(Default)]
    struct FakeBus {
        writes: Vec<(u8, Vec<u8>)>,
        nack: bool,
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for operation in operations {
                if let Operation::Write(bytes) = operation {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_level_and_step_bytes() {
        let mut amp = Max9744::new(FakeBus::default(), &AmplifierConfig::default());
        amp.set_absolute(32).unwrap();
        amp.set_absolute(200).unwrap();
        amp.step(StepDirection::Up).unwrap();
        amp.step(StepDirection::Down).unwrap();

        assert_eq!(
            amp.i2c.writes,
            vec![
                (0x4B, vec![0x20]),
                (0x4B, vec![MAX_VOLUME]),
                (0x4B, vec![0xC4]),
                (0x4B, vec![0xC5]),
            ]
        );
    }

    #[test]
    fn test_nack_is_a_fault() {
        let bus = FakeBus {
            nack: true,
            ..Default::default()
        };
        let mut amp = Max9744::new(bus, &AmplifierConfig::default());
        assert!(matches!(
            amp.set_absolute(10),
            Err(HardwareError::I2cWrite { address: 0x4B, byte: 10, .. })
        ));
    }

    #[test]
    fn test_step_disabled() {
        let config = AmplifierConfig {
            step_commands: false,
            ..Default::default()
        };
        let mut amp = Max9744::new(FakeBus::default(), &config);
        assert!(!amp.supports_step());
        assert!(matches!(
            amp.step(StepDirection::Up),
            Err(HardwareError::StepUnsupported)
        ));
        assert!(amp.i2c.writes.is_empty());
    }
}
