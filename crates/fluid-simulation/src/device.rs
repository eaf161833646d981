//! Compute device abstraction used by the stepper
//!
//! The stepper only ever talks to a [`ComputeDevice`]; what the kernels do is
//! up to the backend. Backends must honour these preconditions:
//!
//! - Every kernel bounds-checks its invocation index against
//!   `SimParams::particle_count`. The last work-group is usually partial.
//! - A kernel never reads its output buffer.
//! - Submissions execute in issue order, and a uniform write is visible to the
//!   next dispatch issued after it and to no earlier one.

use crate::{SimParams, SimulationError};
use fluid_physics::Particle;

/// Named simulation kernels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelStage {
    /// `position += velocity * dt`, everything else copied
    Advection,
    /// Density, pressure and force integration
    Update,
}

impl KernelStage {
    pub const ALL: [KernelStage; 2] = [KernelStage::Advection, KernelStage::Update];

    pub fn index(self) -> usize {
        match self {
            KernelStage::Advection => 0,
            KernelStage::Update => 1,
        }
    }

    /// WGSL entry point
    pub fn entry_point(self) -> &'static str {
        match self {
            KernelStage::Advection => "advect_particles",
            KernelStage::Update => "update_particles",
        }
    }
}

pub trait ComputeDevice {
    /// Handle to one device-resident particle array
    type Buffer;

    /// Allocate a particle buffer holding a copy of `particles`
    fn create_particle_buffer(
        &mut self,
        label: &str,
        particles: &[Particle],
    ) -> Result<Self::Buffer, SimulationError>;

    fn release_particle_buffer(&mut self, buffer: Self::Buffer);

    /// Attach `input` to the stage's read slot and `output` to its write slot
    fn bind_stage(&mut self, stage: KernelStage, input: &Self::Buffer, output: &Self::Buffer);

    /// Replace the whole uniform block
    fn write_params(&mut self, params: &SimParams);

    /// Replace only `SimParams::delta_time`
    fn write_time_step(&mut self, dt: f32);

    fn dispatch(&mut self, stage: KernelStage, workgroups: u32);
}
