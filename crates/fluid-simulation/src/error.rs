//! Simulation error type

use crate::device::KernelStage;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SimulationError {
    /// The particle buffers were already released
    #[error("particle buffers used after release")]
    UseAfterRelease,

    /// A stage would read and write the same buffer in one dispatch
    #[error("{stage:?} stage would bind buffer {buffer} as both input and output")]
    AliasedBinding { stage: KernelStage, buffer: usize },

    #[error("particle count must be positive, got {0}")]
    InvalidParticleCount(u32),

    #[error("lattice width must be positive, got {0}")]
    InvalidLatticeWidth(u32),

    /// No usable compute device; not retried
    #[error("compute device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("could not allocate {bytes} byte particle buffer: {reason}")]
    BufferAllocation { bytes: u64, reason: String },
}
