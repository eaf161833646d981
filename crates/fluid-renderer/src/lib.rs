//! # Fluid Renderer
//!
//! Splats SPH particles into an image on the GPU and presents it on screen.

pub mod palette;
pub mod present;
pub mod splat;

pub use present::*;
pub use splat::*;
