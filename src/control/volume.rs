//! Volume bookkeeping owned by the serializer

use crate::amplifier::controller::clamp_level;
use crate::constants::MIN_VOLUME;

/// Outcome of a volume step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeChange {
    pub previous: u8,
    pub level: u8,
}

impl VolumeChange {
    /// False when the step was absorbed by clamping
    pub fn changed(&self) -> bool {
        self.previous != self.level
    }
}

/// Level, mute flag and restore point
///
/// Stepping while muted moves the restore point but does not unmute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeState {
    level: u8,
    muted: bool,
    pre_mute_level: u8,
}

impl VolumeState {
    pub fn new(level: u8) -> Self {
        let level = clamp_level(level as i32);
        Self {
            level,
            muted: false,
            pre_mute_level: level,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn pre_mute_level(&self) -> u8 {
        self.pre_mute_level
    }

    /// Level the amplifier should be driven at
    pub fn output(&self) -> u8 {
        if self.muted {
            MIN_VOLUME
        } else {
            self.level
        }
    }

    pub fn step(&mut self, delta: i8) -> VolumeChange {
        let previous = self.level;
        self.level = clamp_level(self.level as i32 + delta as i32);
        if self.muted {
            self.pre_mute_level = self.level;
        }
        VolumeChange {
            previous,
            level: self.level,
        }
    }

    /// Flip the mute flag, returning the new value
    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.level = self.pre_mute_level;
            self.muted = false;
        } else {
            self.pre_mute_level = self.level;
            self.muted = true;
        }
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_VOLUME;

    #[test]
    fn test_step_clamps() {
        let mut volume = VolumeState::new(62);
        assert!(volume.step(1).changed());
        let change = volume.step(1);
        assert!(!change.changed());
        assert_eq!(change.level, MAX_VOLUME);

        let mut volume = VolumeState::new(0);
        assert!(!volume.step(-1).changed());
        assert_eq!(volume.level(), 0);
    }

    #[test]
    fn test_new_clamps() {
        assert_eq!(VolumeState::new(200).level(), MAX_VOLUME);
    }

    #[test]
    fn test_mute_round_trip() {
        let mut volume = VolumeState::new(40);
        assert!(volume.toggle_mute());
        assert_eq!(volume.output(), 0);
        assert_eq!(volume.level(), 40);
        assert!(!volume.toggle_mute());
        assert_eq!(volume.output(), 40);
    }

    #[test]
    fn test_step_while_muted_moves_restore_point() {
        let mut volume = VolumeState::new(40);
        volume.toggle_mute();
        volume.step(1);
        volume.step(1);

        assert!(volume.is_muted());
        assert_eq!(volume.output(), 0);
        assert_eq!(volume.pre_mute_level(), 42);

        volume.toggle_mute();
        assert_eq!(volume.output(), 42);
    }
}
