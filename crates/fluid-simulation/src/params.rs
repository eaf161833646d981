//! SPH parameters for runtime tuning

use bytemuck::{Pod, Zeroable};
use fluid_physics::{
    DEFAULT_DOMAIN_HEIGHT, DEFAULT_DOMAIN_WIDTH, DEFAULT_KERNEL_RADIUS,
    DEFAULT_PRESSURE_STIFFNESS, DEFAULT_REST_DENSITY, DEFAULT_VISCOSITY,
};
use glam::Vec2;

/// Host-side tunables, edited from the UI between frames
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphParams {
    pub pressure_stiffness: f32,
    pub rest_density: f32,
    /// Smoothing radius (h)
    pub kernel_radius: f32,
    pub viscosity: f32,
    pub domain_width: f32,
    pub domain_height: f32,
}

impl SphParams {
    pub fn domain(&self) -> Vec2 {
        Vec2::new(self.domain_width, self.domain_height)
    }
}

impl Default for SphParams {
    fn default() -> Self {
        Self {
            pressure_stiffness: DEFAULT_PRESSURE_STIFFNESS,
            rest_density: DEFAULT_REST_DENSITY,
            kernel_radius: DEFAULT_KERNEL_RADIUS,
            viscosity: DEFAULT_VISCOSITY,
            domain_width: DEFAULT_DOMAIN_WIDTH,
            domain_height: DEFAULT_DOMAIN_HEIGHT,
        }
    }
}

/// Uniform block read by both simulation kernels (matches `SimParams` in sph.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SimParams {
    pub pressure_stiffness: f32,
    pub rest_density: f32,
    pub kernel_radius: f32,
    pub viscosity: f32,

    pub domain_size: [f32; 2],
    /// Zero when there is no interaction this frame
    pub interaction_point: [f32; 2],

    /// Rewritten before every dispatch
    pub delta_time: f32,
    pub particle_count: u32,
    pub _padding: [u32; 2],
}

/// Byte offset of `delta_time`, for partial uniform updates
pub const DELTA_TIME_OFFSET: u64 = std::mem::offset_of!(SimParams, delta_time) as u64;

impl SimParams {
    pub fn new(params: &SphParams, particle_count: u32, interaction_point: Vec2, dt: f32) -> Self {
        Self {
            pressure_stiffness: params.pressure_stiffness,
            rest_density: params.rest_density,
            kernel_radius: params.kernel_radius,
            viscosity: params.viscosity,
            domain_size: params.domain().to_array(),
            interaction_point: interaction_point.to_array(),
            delta_time: dt,
            particle_count,
            _padding: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout() {
        // Uniform buffers need a 16 byte multiple
        assert_eq!(std::mem::size_of::<SimParams>(), 48);
        assert_eq!(DELTA_TIME_OFFSET, 32);
        assert_eq!(std::mem::offset_of!(SimParams, domain_size), 16);
    }

    #[test]
    fn delta_time_offset_points_at_the_field() {
        let params = SimParams::new(&SphParams::default(), 100, Vec2::ZERO, 0.25);
        let bytes = bytemuck::bytes_of(&params);
        let offset = DELTA_TIME_OFFSET as usize;
        assert_eq!(&bytes[offset..offset + 4], &0.25f32.to_ne_bytes());
    }

    #[test]
    fn carries_tunables_and_interaction() {
        let sph = SphParams {
            pressure_stiffness: 7.0,
            domain_width: 30.0,
            ..Default::default()
        };
        let params = SimParams::new(&sph, 42, Vec2::new(3.0, 4.0), 0.01);
        assert_eq!(params.pressure_stiffness, 7.0);
        assert_eq!(params.rest_density, 1.0);
        assert_eq!(params.domain_size, [30.0, 50.0]);
        assert_eq!(params.interaction_point, [3.0, 4.0]);
        assert_eq!(params.particle_count, 42);
    }
}
