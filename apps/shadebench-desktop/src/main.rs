mod ui;

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use shadebench_common::{DemoConfig, Preset};
use shadebench_input::{InputState, KeyBindings};
use shadebench_render::{FrameRecorder, HierarchicalModel, LoopState, RecordedFrame, RenderLoop};
use shadebench_render_wgpu::{GpuContext, WgpuRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowId};

/// Pixel-precise scroll deltas are scaled to wheel lines.
const PIXELS_PER_LINE: f32 = 20.0;

#[derive(Parser)]
#[command(
    name = "shadebench-desktop",
    about = "Compare Lambertian, Phong, Cook-Torrance and Blinn lighting side by side"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene tuning preset (teapot or airplane)
    #[arg(short, long)]
    preset: Option<Preset>,

    /// glTF/GLB model to load instead of the configured one
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Start in borderless fullscreen
    #[arg(long)]
    fullscreen: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DemoConfig::default(),
        };
        if let Some(preset) = self.preset {
            config.apply_preset(preset);
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if self.fullscreen {
            config.window.fullscreen = true;
        }
        Ok(config.validated()?)
    }
}

/// Everything the demo mutates between frames.
struct AppState {
    config: DemoConfig,
    model: HierarchicalModel,
    render_loop: RenderLoop,
    input: InputState,
    recorder: FrameRecorder,
    start: Instant,
    show_panel: bool,
}

impl AppState {
    fn new(config: DemoConfig, model: HierarchicalModel) -> Self {
        let render_loop = RenderLoop::new(&config, Duration::ZERO);
        let input =
            InputState::new(KeyBindings::default()).with_mouse_look(config.camera.mouse_look);
        Self {
            config,
            model,
            render_loop,
            input,
            recorder: FrameRecorder::new(),
            start: Instant::now(),
            show_panel: true,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed && key == KeyCode::F1 {
            self.show_panel = !self.show_panel;
            return;
        }
        self.input.handle_key(key, pressed);
    }

    /// Advance the loop and record this frame's draws. `None` once the loop
    /// has stopped.
    fn update(&mut self) -> Option<RecordedFrame> {
        let actions = self.input.poll();
        let now = self.start.elapsed();
        if self.render_loop.begin_frame(now, &actions) == LoopState::ShuttingDown {
            return None;
        }
        self.render_loop.draw(&mut self.recorder, &self.model);
        Some(self.recorder.finish())
    }

    /// Run one egui pass. Runs every frame so egui's input queue is drained
    /// even while the panel is hidden.
    fn run_ui(&mut self, ctx: &EguiContext, raw_input: egui::RawInput) -> egui::FullOutput {
        ctx.run(raw_input, |ctx| {
            ui::draw_panel(
                ctx,
                self.show_panel,
                &mut self.render_loop,
                &self.config.params,
                &self.model.name,
            );
        })
    }
}

/// Window and GPU resources, created on the first `resumed`.
struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: WgpuRenderer,
    egui_ctx: EguiContext,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Graphics {
    fn new(event_loop: &ActiveEventLoop, state: &AppState) -> Result<Self> {
        let window_config = &state.config.window;
        let mut attrs = Window::default_attributes()
            .with_title(format!("shadebench: {}", state.model.name))
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        if window_config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("creating window")?,
        );

        let gpu = GpuContext::new(window.clone())?;
        let (width, height) = gpu.size();
        let renderer = WgpuRenderer::new(&gpu.device, gpu.format(), width, height, &state.model);

        let egui_ctx = EguiContext::default();
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format(), None, 1, false);

        if state.input.mouse_look() {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            match grabbed {
                Ok(()) => window.set_cursor_visible(false),
                Err(e) => tracing::warn!("could not capture cursor for mouse-look: {e}"),
            }
        }

        Ok(Self {
            window,
            gpu,
            renderer,
            egui_ctx,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.gpu.resize(width, height) {
            return false;
        }
        self.renderer.resize(&self.gpu.device, width, height);
        true
    }

    fn render(&mut self, state: &mut AppState) {
        let Some(frame) = state.update() else {
            return;
        };

        let output = match self.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
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

        self.renderer
            .render(&self.gpu.device, &self.gpu.queue, &view, &frame);

        self.render_ui(state, &view);

        output.present();
    }

    fn render_ui(&mut self, state: &mut AppState, view: &wgpu::TextureView) {
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = state.run_ui(&self.egui_ctx, raw_input);
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = self.gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        if !paint_jobs.is_empty() {
            self.paint_ui(view, &paint_jobs, &screen_descriptor);
        }
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    fn paint_ui(
        &mut self,
        view: &wgpu::TextureView,
        paint_jobs: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, paint_jobs, screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
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
            self.egui_renderer
                .render(&mut pass, paint_jobs, screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

struct GpuApp {
    state: AppState,
    graphics: Option<Graphics>,
    startup_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: DemoConfig, model: HierarchicalModel) -> Self {
        Self {
            state: AppState::new(config, model),
            graphics: None,
            startup_error: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match Graphics::new(event_loop, &self.state) {
            Ok(graphics) => {
                let (width, height) = graphics.gpu.size();
                self.state.render_loop.resize(width, height);
                self.graphics = Some(graphics);
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                self.startup_error = Some(e);
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
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        let response = graphics
            .egui_winit
            .on_window_event(&graphics.window, &event);
        let released = matches!(
            event,
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Released,
                    ..
                },
                ..
            }
        );
        // Releases always reach the input state so keys cannot stick.
        if response.consumed && self.state.show_panel && !released {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.render_loop.request_exit();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if graphics.resize(new_size.width, new_size.height) {
                    self.state
                        .render_loop
                        .resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.input.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.state.input.handle_scroll(lines);
            }
            WindowEvent::RedrawRequested => {
                graphics.render(&mut self.state);
                if !self.state.render_loop.is_running() {
                    event_loop.exit();
                    return;
                }
                graphics.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state
                .input
                .handle_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.graphics.take().is_some() {
            tracing::info!(
                frames = self.state.render_loop.frame_index(),
                "released GPU and window resources"
            );
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("shadebench-desktop starting");

    let config = cli
        .resolve_config()
        .inspect_err(|e| tracing::error!("invalid configuration: {e:#}"))?;
    let model = shadebench_assets::load_configured(&config)
        .inspect_err(|e| tracing::error!("failed to load model: {e}"))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, model);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
