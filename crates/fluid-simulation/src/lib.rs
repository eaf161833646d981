//! # Fluid Simulation Engine
//!
//! GPU-resident SPH stepper: double-buffered particle state advanced with a
//! Strang-split advect / update / advect sequence of compute dispatches.

pub mod bindings;
pub mod device;
pub mod error;
pub mod gpu;
pub mod params;
pub mod recording;
pub mod simulation;
pub mod store;

pub use bindings::*;
pub use device::*;
pub use error::*;
pub use gpu::*;
pub use params::*;
pub use recording::*;
pub use simulation::*;
pub use store::*;
