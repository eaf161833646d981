//! wgpu backend for the simulation kernels

use crate::{ComputeDevice, KernelStage, SimParams, SimulationError, DELTA_TIME_OFFSET};
use fluid_physics::{Particle, PARTICLE_STRIDE};
use wgpu::util::DeviceExt;

/// Adapter, device and queue acquired for the simulation
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Pick an adapter (compatible with `surface` when given) and open a device.
    ///
    /// Fails with `DeviceUnavailable` when there is no adapter or it cannot
    /// run compute shaders. This is a capability check and is not retried.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, SimulationError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SimulationError::DeviceUnavailable(e.to_string()))?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            return Err(SimulationError::DeviceUnavailable(format!(
                "{} does not support compute shaders",
                adapter.get_info().name
            )));
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("SPH Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| SimulationError::DeviceUnavailable(e.to_string()))?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }
}

/// Advection and update kernels from `shaders/sph.wgsl`.
///
/// Layout of the single bind group:
/// 0: particles (storage, read), 1: particles_new (storage, write), 2: params (uniform)
pub struct WgpuCompute {
    device: wgpu::Device,
    queue: wgpu::Queue,
    params_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    pipelines: [wgpu::ComputePipeline; 2],
    bind_groups: [Option<wgpu::BindGroup>; 2],
}

impl WgpuCompute {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        log::info!("Initializing SPH kernels...");

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SPH Params Buffer"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SPH Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sph.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SPH Bind Group Layout"),
            entries: &[
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
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("SPH Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipelines = KernelStage::ALL.map(|stage| {
            log::info!("Creating {:?} pipeline...", stage);
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(stage.entry_point()),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(stage.entry_point()),
                compilation_options: Default::default(),
                cache: None,
            })
        });

        log::info!("Pipelines created");

        Self {
            device,
            queue,
            params_buffer,
            bind_group_layout,
            pipelines,
            bind_groups: [None, None],
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl ComputeDevice for WgpuCompute {
    type Buffer = wgpu::Buffer;

    fn create_particle_buffer(
        &mut self,
        label: &str,
        particles: &[Particle],
    ) -> Result<wgpu::Buffer, SimulationError> {
        let bytes = (particles.len() * PARTICLE_STRIDE) as u64;
        let limit = self.device.limits().max_storage_buffer_binding_size as u64;
        if bytes > limit {
            return Err(SimulationError::BufferAllocation {
                bytes,
                reason: format!("exceeds max storage binding size of {} bytes", limit),
            });
        }

        Ok(self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(particles),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            }))
    }

    fn release_particle_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn bind_stage(&mut self, stage: KernelStage, input: &wgpu::Buffer, output: &wgpu::Buffer) {
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SPH Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params_buffer.as_entire_binding(),
                },
            ],
        });
        self.bind_groups[stage.index()] = Some(bind_group);
    }

    fn write_params(&mut self, params: &SimParams) {
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[*params]));
    }

    fn write_time_step(&mut self, dt: f32) {
        self.queue
            .write_buffer(&self.params_buffer, DELTA_TIME_OFFSET, bytemuck::bytes_of(&dt));
    }

    /// Submitted on its own: `write_buffer` lands at the start of the next
    /// submission, so batching the three stages into one encoder would make
    /// every stage see the last time step written.
    fn dispatch(&mut self, stage: KernelStage, workgroups: u32) {
        let Some(bind_group) = &self.bind_groups[stage.index()] else {
            log::error!("{:?} dispatched before its buffers were bound", stage);
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("SPH Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(stage.entry_point()),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipelines[stage.index()]);
            compute_pass.set_bind_group(0, bind_group, &[]);
            compute_pass.dispatch_workgroups(workgroups, 1, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
