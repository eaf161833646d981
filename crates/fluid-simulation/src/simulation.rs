//! Strang-split SPH stepper
//!
//! Each frame advances the particles with three dispatches:
//! advect `dt/2`, update `dt`, advect `dt/2`. Every dispatch writes the
//! scratch buffer and is followed by a swap, so after `step` the current
//! buffer holds the fully advanced state.

use crate::{
    ComputeDevice, KernelBindings, KernelStage, ParticleStore, SimParams, SimulationError,
    SphParams,
};
use fluid_physics::PARTICLE_WORKGROUP_SIZE;
use glam::Vec2;

/// Work-groups needed to cover `particle_count` particles
pub fn workgroup_count(particle_count: u32) -> u32 {
    particle_count.div_ceil(PARTICLE_WORKGROUP_SIZE)
}

/// The three sub-steps of one frame with their time increments
pub fn strang_stages(dt: f32) -> [(KernelStage, f32); 3] {
    [
        (KernelStage::Advection, dt * 0.5),
        (KernelStage::Update, dt),
        (KernelStage::Advection, dt * 0.5),
    ]
}

/// Particle simulation driven through a [`ComputeDevice`]
pub struct Simulation<D: ComputeDevice> {
    device: D,
    store: ParticleStore<D::Buffer>,
    bindings: KernelBindings,
    params: SphParams,
    interaction: Vec2,
}

impl<D: ComputeDevice> Simulation<D> {
    pub fn new(
        mut device: D,
        params: SphParams,
        particle_count: u32,
        lattice_width: u32,
    ) -> Result<Self, SimulationError> {
        let store = ParticleStore::initialize(&mut device, particle_count, lattice_width)?;
        let bindings = KernelBindings::new();
        bindings.bind_all(&mut device, &store)?;

        Ok(Self {
            device,
            store,
            bindings,
            params,
            interaction: Vec2::ZERO,
        })
    }

    /// Advance the simulation by `dt`
    pub fn step(&mut self, dt: f32) -> Result<(), SimulationError> {
        let particle_count = self.store.particle_count()?;
        let workgroups = workgroup_count(particle_count);

        self.device.write_params(&SimParams::new(
            &self.params,
            particle_count,
            self.interaction,
            dt,
        ));

        for (stage, stage_dt) in strang_stages(dt) {
            self.device.write_time_step(stage_dt);
            self.device.dispatch(stage, workgroups);
            self.bindings.swap(&mut self.device, &self.store)?;
        }

        Ok(())
    }

    pub fn params(&self) -> &SphParams {
        &self.params
    }

    /// Takes effect at the next `step`
    pub fn set_params(&mut self, params: SphParams) {
        self.params = params;
    }

    /// Domain-space interaction point for the next `step`, `Vec2::ZERO` for none
    pub fn set_interaction(&mut self, point: Vec2) {
        self.interaction = point;
    }

    pub fn interaction(&self) -> Vec2 {
        self.interaction
    }

    pub fn particle_count(&self) -> Result<u32, SimulationError> {
        self.store.particle_count()
    }

    pub fn current_index(&self) -> usize {
        self.bindings.current()
    }

    /// Swaps performed since initialization
    pub fn generation(&self) -> u64 {
        self.bindings.generation()
    }

    /// Buffer holding the latest state, for rendering
    pub fn current_buffer(&self) -> Result<&D::Buffer, SimulationError> {
        self.store.buffer(self.bindings.current())
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Free the particle buffers; the simulation is unusable afterwards
    pub fn release(&mut self) -> Result<(), SimulationError> {
        self.store.release(&mut self.device)
    }
}

impl<D: ComputeDevice> Drop for Simulation<D> {
    fn drop(&mut self) {
        if !self.store.is_released() {
            let _ = self.store.release(&mut self.device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_round_up() {
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(100), 1);
        assert_eq!(workgroup_count(128), 1);
        assert_eq!(workgroup_count(129), 2);
        assert_eq!(workgroup_count(257), 3);
    }

    #[test]
    fn stages_are_symmetric() {
        let stages = strang_stages(0.02);
        assert_eq!(stages[0], (KernelStage::Advection, 0.01));
        assert_eq!(stages[1], (KernelStage::Update, 0.02));
        assert_eq!(stages[2], (KernelStage::Advection, 0.01));
    }
}
