//! Command serialization and the state it owns

pub mod serializer;
pub mod shutdown;
pub mod volume;

pub use serializer::{ExitReason, InputGate, RadioController, RadioStatus};
pub use shutdown::{CommandPower, HardwareClaim, PowerControl, ShutdownSequencer};
pub use volume::{VolumeChange, VolumeState};
