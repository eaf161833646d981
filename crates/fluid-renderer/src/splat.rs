//! Splats the current particle buffer into a fixed-size image

use bytemuck::{Pod, Zeroable};
use fluid_physics::SPLAT_TILE_SIZE;
use glam::Vec2;

use crate::palette::splat_palette;

pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Field shown in the output image (the integer is what the kernel switches on)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Density = 1,
    Velocity = 2,
    Pressure = 3,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [RenderMode::Density, RenderMode::Velocity, RenderMode::Pressure];

    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(RenderMode::Density),
            2 => Some(RenderMode::Velocity),
            3 => Some(RenderMode::Pressure),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Density => "Density",
            RenderMode::Velocity => "Velocity",
            RenderMode::Pressure => "Pressure",
        }
    }
}

/// Per-frame inputs of the splat kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatSettings {
    pub domain: Vec2,
    pub smoothing_length: f32,
    pub mode: RenderMode,
    pub particle_count: u32,
}

/// Uniform block of `splat.wgsl`
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct SplatParams {
    domain_size: [f32; 2],
    image_size: [u32; 2],
    smoothing_length: f32,
    render_mode: u32,
    particle_count: u32,
    _padding: u32,
    palette: [[f32; 4]; 4],
}

/// Work-groups covering a `width` x `height` image
pub fn splat_workgroups(width: u32, height: u32) -> (u32, u32) {
    (
        width.div_ceil(SPLAT_TILE_SIZE),
        height.div_ceil(SPLAT_TILE_SIZE),
    )
}

pub struct RenderSplatter {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    texture_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl RenderSplatter {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Splat Params Buffer"),
            size: std::mem::size_of::<SplatParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Splat Output Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Splat Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/splat.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Splat Bind Group Layout"),
            entries: &[
                // Particles (Storage) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Params (Uniform) - Binding 1
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Output image - Binding 2
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: OUTPUT_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Splat Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Splat Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("render_particles"),
            compilation_options: Default::default(),
            cache: None,
        });

        log::info!("Splat pipeline created ({}x{})", width, height);

        Self {
            pipeline,
            bind_group_layout,
            params_buffer,
            texture_view,
            width,
            height,
        }
    }

    pub fn texture_view(&self) -> &wgpu::TextureView {
        &self.texture_view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Splat `particle_buffer` (the simulation's current buffer) into the output image
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        particle_buffer: &wgpu::Buffer,
        settings: &SplatSettings,
    ) {
        let params = SplatParams {
            domain_size: settings.domain.to_array(),
            image_size: [self.width, self.height],
            smoothing_length: settings.smoothing_length,
            render_mode: settings.mode as u32,
            particle_count: settings.particle_count,
            _padding: 0,
            palette: splat_palette(),
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));

        // Rebuilt every frame: the current buffer alternates
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Splat Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&self.texture_view),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Splat Encoder"),
        });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Splat Pass"),
                timestamp_writes: None,
            });
            let (groups_x, groups_y) = splat_workgroups(self.width, self.height);
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            compute_pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}
