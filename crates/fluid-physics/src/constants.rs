//! Constants shared between the host and the WGSL kernels
//!
//! Anything here that also appears in a shader must be changed in both places.

/// Particles processed per device work-group by the simulation kernels
/// (`@workgroup_size(128)` in `sph.wgsl`)
pub const PARTICLE_WORKGROUP_SIZE: u32 = 128;

/// Edge length of the square tile of pixels processed per work-group by the splat kernel
/// (`@workgroup_size(8, 8)` in `splat.wgsl`)
pub const SPLAT_TILE_SIZE: u32 = 8;

/// Size of one particle record on the device: 7 tightly packed f32
pub const PARTICLE_STRIDE: usize = 7 * std::mem::size_of::<f32>();

/// Mass given to every lattice particle
pub const PARTICLE_MASS: f32 = 1.0;

/// Density a particle starts with before the update kernel first runs
pub const INITIAL_DENSITY: f32 = 1.0;

/// Pressure stiffness (k in p = k * (rho - rho0))
pub const DEFAULT_PRESSURE_STIFFNESS: f32 = 5.0;

/// Rest density (rho0)
pub const DEFAULT_REST_DENSITY: f32 = 1.0;

/// Smoothing radius of the SPH kernels (h)
pub const DEFAULT_KERNEL_RADIUS: f32 = 2.0;

/// Viscosity coefficient (nu)
pub const DEFAULT_VISCOSITY: f32 = 1.0;

/// Domain extent in simulation units
pub const DEFAULT_DOMAIN_WIDTH: f32 = 50.0;
pub const DEFAULT_DOMAIN_HEIGHT: f32 = 50.0;

/// Smoothing radius used when splatting particles into the output image
pub const DEFAULT_RENDER_SMOOTHING_LENGTH: f32 = 5.0;
