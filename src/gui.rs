use egui::Context;
use egui_wgpu::Renderer;
use egui_winit::State;
use fluid_renderer::RenderMode;
use fluid_simulation::SphParams;
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

use crate::config::SessionConfig;

pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    pub particle_count: u32,
    pub running: bool,
    pub render_mode: RenderMode,
    pub sph_params: SphParams,
    pub render_smoothing_length: f32,
}

impl UiState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            fps: 0.0,
            frame_time: 0.0,
            particle_count: config.particle_count,
            running: config.start_running,
            render_mode: RenderMode::Density,
            sph_params: config.sph,
            render_smoothing_length: config.render_smoothing_length,
        }
    }
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
}

impl Gui {
    pub fn new(device: &Device, output_color_format: TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            egui_wgpu::RendererOptions {
                msaa_samples: 1,
                depth_stencil_format: None,
                dithering: false,
                ..Default::default()
            },
        );

        Self {
            context,
            state,
            renderer,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    /// True while the pointer is over a panel
    pub fn wants_pointer(&self) -> bool {
        self.context.wants_pointer_input()
    }

    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
    ) {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            Self::ui(ctx, ui_state);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        let mut render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();

        self.renderer
            .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        drop(render_pass);

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    fn ui(ctx: &Context, state: &mut UiState) {
        // Diagnostics Panel (Top Left)
        egui::Window::new("Diagnostics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
                ui.label(format!("Particles: {}", state.particle_count));
            });

        // Simulation Controls (Bottom Left)
        egui::Window::new("Simulation")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.checkbox(&mut state.running, "Running (Space)");

                ui.separator();
                ui.heading("Fluid");
                let params = &mut state.sph_params;
                ui.add(
                    egui::Slider::new(&mut params.pressure_stiffness, 0.0..=50.0)
                        .text("Pressure Stiffness"),
                );
                ui.add(
                    egui::Slider::new(&mut params.rest_density, 0.01..=5.0).text("Rest Density"),
                );
                ui.add(
                    egui::Slider::new(&mut params.kernel_radius, 0.5..=10.0)
                        .text("Kernel Radius (h)"),
                );
                ui.add(
                    egui::Slider::new(&mut params.viscosity, 0.0..=10.0).text("Viscosity (nu)"),
                );

                ui.separator();
                ui.heading("Domain");
                ui.add(egui::Slider::new(&mut params.domain_width, 5.0..=200.0).text("Width"));
                ui.add(egui::Slider::new(&mut params.domain_height, 5.0..=200.0).text("Height"));

                ui.separator();
                ui.heading("Rendering");
                for mode in RenderMode::ALL {
                    ui.radio_value(
                        &mut state.render_mode,
                        mode,
                        format!("{} ({})", mode.label(), mode as u32),
                    );
                }
                ui.add(
                    egui::Slider::new(&mut state.render_smoothing_length, 0.5..=20.0)
                        .text("Smoothing Length"),
                );
            });
    }
}
