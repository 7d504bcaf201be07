use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use fieldwalk_common::SceneConfig;
use fieldwalk_input::{Action, HeldActions};
use fieldwalk_kernel::StepOutcome;
use fieldwalk_render::{FrameLoop, FrameReport, RenderError};
use fieldwalk_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "fieldwalk-desktop", about = "Walk a cylinder around a field")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML). Defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Physical key to logical action.
fn action_for_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Action::MoveForward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Action::MoveBackward),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Action::TurnLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Action::TurnRight),
        _ => None,
    }
}

/// Input and HUD state. The scene itself lives in the frame loop.
struct AppState {
    held: HeldActions,
    show_hud: bool,
    last_report: Option<FrameReport>,
}

impl AppState {
    fn new() -> Self {
        Self {
            held: HeldActions::new(),
            show_hud: true,
            last_report: None,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(action) = action_for_key(key) {
            self.held.set(action, pressed);
            return;
        }
        if pressed && key == KeyCode::F1 {
            self.show_hud = !self.show_hud;
        }
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        egui::Window::new("Fieldwalk")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                match &self.last_report {
                    Some(report) => {
                        let p = report.player.position;
                        ui.label(format!("Tick: {}", report.tick));
                        ui.label(format!("Player: ({:.1}, {:.1})", p.x, p.z));
                        ui.label(format!("Yaw: {:.1}°", report.player.yaw.to_degrees()));
                        ui.label(format!(
                            "Camera: ({:.1}, {:.1}, {:.1})",
                            report.camera.eye.x, report.camera.eye.y, report.camera.eye.z
                        ));
                        let status = match report.outcome {
                            StepOutcome::Idle => "idle",
                            StepOutcome::Moved => "moving",
                            StepOutcome::Blocked => "blocked",
                        };
                        ui.label(format!("Status: {status}"));
                    }
                    None => {
                        ui.label("Waiting for first frame");
                    }
                }
                let held: Vec<_> = self.held.iter().map(|a| a.name()).collect();
                ui.label(format!("Held: {}", held.join(", ")));
                ui.separator();
                ui.small("W/S: Move | A/D: Turn | F1: Toggle HUD");
            });
    }
}

struct GpuApp {
    scene_config: SceneConfig,
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    frame_loop: Option<FrameLoop<WgpuRenderer>>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    setup_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(scene_config: SceneConfig) -> Self {
        Self {
            scene_config,
            state: AppState::new(),
            window: None,
            surface: None,
            surface_config: None,
            frame_loop: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            setup_error: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Fieldwalk")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fieldwalk_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // Colors are authored as display values, so skip the sRGB encode.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        let renderer = WgpuRenderer::new(
            device,
            queue,
            surface_format,
            surface_config.width,
            surface_config.height,
            self.scene_config.palette.sky,
        )?;
        let frame_loop = FrameLoop::new(&self.scene_config, renderer)?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.surface_config = Some(surface_config);
        self.frame_loop = Some(frame_loop);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(surface), Some(config), Some(frame_loop)) =
            (&self.surface, &mut self.surface_config, &mut self.frame_loop)
        else {
            return;
        };
        config.width = new_size.width.max(1);
        config.height = new_size.height.max(1);
        surface.configure(frame_loop.renderer().device(), config);
        frame_loop.resize(config.width, config.height);
    }

    /// One tick: step, draw the scene, then the HUD on top.
    fn redraw(&mut self) {
        let (Some(window), Some(surface), Some(config), Some(frame_loop)) = (
            &self.window,
            &self.surface,
            &self.surface_config,
            &mut self.frame_loop,
        ) else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                surface.configure(frame_loop.renderer().device(), config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let report = frame_loop.tick(self.state.held);
        if let Err(e) = frame_loop.renderer_mut().present(&view) {
            tracing::error!("frame submission failed: {e}");
        }
        self.state.last_report = Some(report);

        let (Some(egui_winit), Some(egui_renderer)) =
            (&mut self.egui_winit, &mut self.egui_renderer)
        else {
            output.present();
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let state = &self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_hud(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = frame_loop.renderer().device();
        let queue = frame_loop.renderer().queue();
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("setup failed: {e:#}");
            self.setup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::Focused(false) => {
                // Key-up events are not delivered while unfocused.
                self.state.held.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let scene_config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    scene_config.validate()?;

    tracing::info!("fieldwalk-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene_config);
    event_loop.run_app(&mut app)?;

    match app.setup_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
