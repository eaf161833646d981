//! Startup configuration

use fluid_physics::DEFAULT_RENDER_SMOOTHING_LENGTH;
use fluid_simulation::SphParams;

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub particle_count: u32,
    pub lattice_width: u32,
    pub sph: SphParams,
    pub render_smoothing_length: f32,
    /// Splat image resolution
    pub image_width: u32,
    pub image_height: u32,
    pub start_running: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            lattice_width: 10,
            sph: SphParams::default(),
            render_smoothing_length: DEFAULT_RENDER_SMOOTHING_LENGTH,
            image_width: 1024,
            image_height: 1024,
            start_running: true,
        }
    }
}
