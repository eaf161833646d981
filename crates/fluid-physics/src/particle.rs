//! Particle record and initial lattice layout

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::constants::{INITIAL_DENSITY, PARTICLE_MASS, PARTICLE_STRIDE};

/// GPU-compatible SPH particle.
///
/// Laid out as 7 consecutive f32 so the device buffer has a 28 byte stride.
/// The WGSL side declares the same struct with scalar fields only; a `vec2`
/// member would raise the alignment to 8 and pad the stride to 32.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    /// Always positive
    pub mass: f32,
    /// Written by the update kernel
    pub density: f32,
    /// Written by the update kernel
    pub pressure: f32,
}

const _: () = assert!(std::mem::size_of::<Particle>() == PARTICLE_STRIDE);

impl Particle {
    /// A particle at rest with unit mass
    pub fn at_rest(position: Vec2) -> Self {
        Self {
            position: position.to_array(),
            velocity: [0.0; 2],
            mass: PARTICLE_MASS,
            density: INITIAL_DENSITY,
            pressure: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from_array(self.velocity)
    }
}

/// Lay `count` particles out row by row, `lattice_width` per row, one unit apart.
///
/// Particle `i` sits at `x = i % w - w / 2`, `y = i / w` (integer division), so
/// rows grow upwards from the bottom of the domain and are centred horizontally.
/// `lattice_width` must be non-zero.
pub fn lattice(count: u32, lattice_width: u32) -> Vec<Particle> {
    let half_width = (lattice_width / 2) as i64;

    (0..count)
        .map(|i| {
            let x = (i % lattice_width) as i64 - half_width;
            let y = (i / lattice_width) as i64;
            Particle::at_rest(Vec2::new(x as f32, y as f32))
        })
        .collect()
}
