//! Catppuccin Mocha colours in linear space

use catppuccin::PALETTE;

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear(color: &catppuccin::Color) -> [f32; 4] {
    [
        srgb_to_linear(color.rgb.r),
        srgb_to_linear(color.rgb.g),
        srgb_to_linear(color.rgb.b),
        1.0,
    ]
}

/// Background followed by the ramp end colour of each render mode
pub fn splat_palette() -> [[f32; 4]; 4] {
    let colors = &PALETTE.mocha.colors;
    [
        linear(&colors.base),
        linear(&colors.sky),
        linear(&colors.peach),
        linear(&colors.mauve),
    ]
}

/// Letterbox clear colour
pub fn clear_color() -> wgpu::Color {
    let [r, g, b, a] = linear(&PALETTE.mocha.colors.crust);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}
