//! 2D SPH Fluid Simulation
//!
//! Runs smoothed-particle hydrodynamics on the GPU and renders the particle
//! field as a density, velocity or pressure image.

mod config;
mod gui;

use config::SessionConfig;
use fluid_physics::{DisplayTransform, InteractionSampler};
use fluid_renderer::{ImagePresenter, RenderMode, RenderSplatter, SplatSettings};
use fluid_simulation::{GpuContext, Simulation, SimulationError, WgpuCompute};
use glam::Vec2;
use gui::{Gui, UiState};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Upper bound on the simulated time per frame (seconds)
const MAX_FRAME_DT: f32 = 1.0 / 30.0;

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    simulation: Simulation<WgpuCompute>,
    splatter: RenderSplatter,
    presenter: ImagePresenter,
    interaction: InteractionSampler,

    gui: Gui,
    ui_state: UiState,

    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>, session: SessionConfig) -> Result<Self, SimulationError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| SimulationError::DeviceUnavailable(e.to_string()))?;

        let GpuContext {
            adapter,
            device,
            queue,
        } = GpuContext::new(&instance, Some(&surface)).await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or_else(|| {
                SimulationError::DeviceUnavailable("surface has no supported formats".into())
            })?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let compute = WgpuCompute::new(device.clone(), queue.clone());
        let simulation = Simulation::new(
            compute,
            session.sph,
            session.particle_count,
            session.lattice_width,
        )?;
        log::info!(
            "✓ Simulation initialized ({} particles)",
            session.particle_count
        );

        let splatter = RenderSplatter::new(&device, session.image_width, session.image_height);
        let presenter = ImagePresenter::new(&device, config.format, splatter.texture_view());
        log::info!(
            "✓ Renderer initialized ({}x{} image)",
            session.image_width,
            session.image_height
        );

        let gui = Gui::new(&device, config.format, &window);
        let ui_state = UiState::new(&session);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            simulation,
            splatter,
            presenter,
            interaction: InteractionSampler::new(session.sph.domain()),
            gui,
            ui_state,
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn display_transform(&self) -> DisplayTransform {
        DisplayTransform::letterboxed(self.config.width, self.config.height)
    }

    /// Advance the simulation by one frame and draw it.
    ///
    /// `pointer` is the cursor position while the left button is held.
    fn render(
        &mut self,
        window: &Window,
        pointer: Option<Vec2>,
    ) -> Result<(f32, f32), wgpu::SurfaceError> {
        // Track frame time
        let now = Instant::now();
        let frame_seconds = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.frame_times.push_back(frame_seconds * 1000.0);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = if avg_frame_time > 0.0 {
            1000.0 / avg_frame_time
        } else {
            0.0
        };
        self.ui_state.fps = fps;
        self.ui_state.frame_time = avg_frame_time;

        // Parameters edited in the panel take effect on this step
        let params = self.ui_state.sph_params;
        self.simulation.set_params(params);
        self.interaction.domain = params.domain();

        let transform = self.display_transform();
        let point = self.interaction.sample(
            pointer.is_some(),
            pointer.unwrap_or(Vec2::ZERO),
            &transform,
        );
        self.simulation.set_interaction(point);

        if self.ui_state.running {
            let dt = frame_seconds.min(MAX_FRAME_DT);
            if let Err(e) = self.simulation.step(dt) {
                log::error!("Simulation step failed: {e}");
                self.ui_state.running = false;
            }
        }

        match self.simulation.current_buffer() {
            Ok(particle_buffer) => {
                let settings = SplatSettings {
                    domain: params.domain(),
                    smoothing_length: self.ui_state.render_smoothing_length,
                    mode: self.ui_state.render_mode,
                    particle_count: self.ui_state.particle_count,
                };
                self.splatter
                    .render(&self.device, &self.queue, particle_buffer, &settings);
            }
            Err(e) => log::error!("Nothing to render: {e}"),
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.presenter
            .render(&mut encoder, &view, transform.viewport());

        self.gui.render(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            &mut self.ui_state,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok((fps, avg_frame_time))
    }

    fn toggle_running(&mut self) {
        self.ui_state.running = !self.ui_state.running;
        log::debug!(
            "simulation {}",
            if self.ui_state.running {
                "resumed"
            } else {
                "paused"
            }
        );
    }

    fn set_render_mode(&mut self, mode: RenderMode) {
        self.ui_state.render_mode = mode;
        log::debug!("render mode: {}", mode.label());
    }

    /// Free the particle buffers before the device goes away
    fn shutdown(&mut self) {
        if let Err(e) = self.simulation.release() {
            log::warn!("Simulation teardown: {e}");
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    session: SessionConfig,

    left_mouse_pressed: bool,
    last_cursor_pos: Option<Vec2>,
}

impl App {
    fn new(session: SessionConfig) -> Self {
        Self {
            window: None,
            gpu_state: None,
            session,
            left_mouse_pressed: false,
            last_cursor_pos: None,
        }
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(gpu_state) = &mut self.gpu_state {
            gpu_state.shutdown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("SPH Fluid Simulation")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 1024));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone(), self.session)) {
            Ok(gpu_state) => {
                self.window = Some(window);
                self.gpu_state = Some(gpu_state);
            }
            Err(e) => {
                log::error!("Failed to start simulation: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Handle GUI events
        if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
            if gpu_state.gui.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.exit(event_loop),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    match code {
                        KeyCode::Space => gpu_state.toggle_running(),
                        KeyCode::Digit1 => gpu_state.set_render_mode(RenderMode::Density),
                        KeyCode::Digit2 => gpu_state.set_render_mode(RenderMode::Velocity),
                        KeyCode::Digit3 => gpu_state.set_render_mode(RenderMode::Pressure),
                        _ => {}
                    }
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let over_gui = self
                    .gpu_state
                    .as_ref()
                    .is_some_and(|gpu_state| gpu_state.gui.wants_pointer());
                self.left_mouse_pressed = state == ElementState::Pressed && !over_gui;
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.last_cursor_pos = Some(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => {
                self.last_cursor_pos = None;
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::RedrawRequested => {
                let pointer = self
                    .last_cursor_pos
                    .filter(|_| self.left_mouse_pressed);

                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render(window, pointer) {
                        Ok((fps, frame_time)) => {
                            window.set_title(&format!(
                                "SPH Fluid - {:.0} FPS ({:.2}ms) - {}",
                                fps,
                                frame_time,
                                gpu_state.ui_state.render_mode.label()
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory");
                            gpu_state.shutdown();
                            event_loop.exit();
                            return;
                        }
                        Err(e) => log::warn!("Render error: {e:?}"),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting SPH fluid simulation...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {e}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(SessionConfig::default());

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {e}");
    }
}
