//! Pointer interaction: screen position to domain-space force point

use glam::Vec2;

/// Where the simulation image is drawn on screen, in physical pixels.
///
/// The image is shown on a square quad whose local space spans `[-0.5, 0.5]`
/// on both axes with y pointing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayTransform {
    /// Quad centre in window pixels
    pub center: Vec2,
    /// Quad edge length in window pixels
    pub size: f32,
}

impl DisplayTransform {
    /// Largest square that fits the window, centred
    pub fn letterboxed(width: u32, height: u32) -> Self {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        Self {
            center: Vec2::new(width * 0.5, height * 0.5),
            size: width.min(height),
        }
    }

    /// Window pixel (y down) to quad local coordinates (y up)
    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.center.x) / self.size,
            (self.center.y - screen.y) / self.size,
        )
    }

    /// Viewport rectangle `(x, y, width, height)` covered by the quad
    pub fn viewport(&self) -> [f32; 4] {
        let half = self.size * 0.5;
        [
            self.center.x - half,
            self.center.y - half,
            self.size,
            self.size,
        ]
    }
}

/// Scale applied to quad-local coordinates: the larger domain extent
pub fn domain_scale(domain: Vec2) -> f32 {
    domain.x.max(domain.y)
}

/// Quad-local point to domain space.
///
/// The vertical offset puts local `y = -0.5` on the domain floor (`y = 0`),
/// matching the lattice, which grows upwards from zero.
pub fn local_to_domain(local: Vec2, domain: Vec2) -> Vec2 {
    let scale = domain_scale(domain);
    local * scale + Vec2::Y * scale * 0.5
}

/// Converts pointer input into the interaction point for the update kernel.
///
/// `Vec2::ZERO` means "no interaction this frame"; the update kernel ignores it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionSampler {
    pub domain: Vec2,
}

impl InteractionSampler {
    pub fn new(domain: Vec2) -> Self {
        Self { domain }
    }

    pub fn sample(&self, pointer_active: bool, pointer: Vec2, transform: &DisplayTransform) -> Vec2 {
        if !pointer_active {
            return Vec2::ZERO;
        }
        local_to_domain(transform.to_local(pointer), self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> InteractionSampler {
        InteractionSampler::new(Vec2::new(50.0, 50.0))
    }

    #[test]
    fn released_pointer_is_always_zero() {
        let transform = DisplayTransform::letterboxed(800, 600);
        for pointer in [Vec2::ZERO, Vec2::new(400.0, 300.0), Vec2::new(-20.0, 9000.0)] {
            assert_eq!(sampler().sample(false, pointer, &transform), Vec2::ZERO);
        }
    }

    #[test]
    fn quad_centre_maps_to_middle_of_domain() {
        let transform = DisplayTransform::letterboxed(800, 600);
        let point = sampler().sample(true, Vec2::new(400.0, 300.0), &transform);
        assert_eq!(point, Vec2::new(0.0, 25.0));
    }

    #[test]
    fn quad_bottom_edge_is_domain_floor() {
        let transform = DisplayTransform::letterboxed(600, 600);
        let point = sampler().sample(true, Vec2::new(300.0, 600.0), &transform);
        assert_eq!(point, Vec2::new(0.0, 0.0));

        let point = sampler().sample(true, Vec2::new(0.0, 0.0), &transform);
        assert_eq!(point, Vec2::new(-25.0, 50.0));
    }

    #[test]
    fn scale_uses_larger_extent() {
        let local = Vec2::new(0.5, 0.0);
        assert_eq!(local_to_domain(local, Vec2::new(20.0, 80.0)), Vec2::new(40.0, 40.0));
        assert_eq!(domain_scale(Vec2::new(20.0, 80.0)), 80.0);
    }

    #[test]
    fn letterbox_fits_the_short_side() {
        let transform = DisplayTransform::letterboxed(1000, 400);
        assert_eq!(transform.size, 400.0);
        assert_eq!(transform.viewport(), [300.0, 0.0, 400.0, 400.0]);
    }
}
