//! Double-buffered particle state

use crate::{ComputeDevice, SimulationError};
use fluid_physics::lattice;

/// Owns the two particle buffers. Both are allocated from the same lattice at
/// initialization and freed together by [`ParticleStore::release`].
pub struct ParticleStore<B> {
    buffers: Option<[B; 2]>,
    particle_count: u32,
}

impl<B> ParticleStore<B> {
    pub fn initialize<D>(
        device: &mut D,
        particle_count: u32,
        lattice_width: u32,
    ) -> Result<Self, SimulationError>
    where
        D: ComputeDevice<Buffer = B>,
    {
        if particle_count == 0 {
            return Err(SimulationError::InvalidParticleCount(particle_count));
        }
        if lattice_width == 0 {
            return Err(SimulationError::InvalidLatticeWidth(lattice_width));
        }

        let particles = lattice(particle_count, lattice_width);

        let front = device.create_particle_buffer("Particle Buffer 0", &particles)?;
        let back = match device.create_particle_buffer("Particle Buffer 1", &particles) {
            Ok(buffer) => buffer,
            Err(err) => {
                device.release_particle_buffer(front);
                return Err(err);
            }
        };

        log::info!(
            "Particle buffers created: {} particles, lattice width {}",
            particle_count,
            lattice_width
        );

        Ok(Self {
            buffers: Some([front, back]),
            particle_count,
        })
    }

    pub fn buffers(&self) -> Result<&[B; 2], SimulationError> {
        self.buffers.as_ref().ok_or(SimulationError::UseAfterRelease)
    }

    pub fn buffer(&self, index: usize) -> Result<&B, SimulationError> {
        Ok(&self.buffers()?[index])
    }

    pub fn particle_count(&self) -> Result<u32, SimulationError> {
        self.buffers()?;
        Ok(self.particle_count)
    }

    pub fn is_released(&self) -> bool {
        self.buffers.is_none()
    }

    /// Free both buffers. A second call fails with `UseAfterRelease`.
    pub fn release<D>(&mut self, device: &mut D) -> Result<(), SimulationError>
    where
        D: ComputeDevice<Buffer = B>,
    {
        let [front, back] = self.buffers.take().ok_or(SimulationError::UseAfterRelease)?;
        device.release_particle_buffer(front);
        device.release_particle_buffer(back);
        log::info!("Particle buffers released");
        Ok(())
    }
}
