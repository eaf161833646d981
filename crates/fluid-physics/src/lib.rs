//! # Fluid Physics
//!
//! Host-side data shared by the SPH simulation and renderer: the particle
//! record, the initial lattice, kernel constants and pointer interaction.

pub mod constants;
pub mod interaction;
pub mod particle;

pub use constants::*;
pub use interaction::*;
pub use particle::*;
