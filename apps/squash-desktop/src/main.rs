use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use squash_common::{BodyId, Color};
use squash_kernel::{Scene, StepStats, World};
use squash_present::{FramePresenter, GpuContext};
use squash_raster::{Framebuffer, RenderView, SoftwareRenderer};
use squash_tools::WorldInspector;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "squash-desktop", about = "Squash desktop demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene file (.yaml, .yml or .json); the built-in demo if omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Framebuffer width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Framebuffer height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Simulation ticks per second
    #[arg(long, default_value = "60")]
    tick_rate: f64,
}

/// Most ticks run for one frame; a long stall drops time instead of
/// stepping through all of it.
const MAX_TICKS_PER_FRAME: u32 = 8;

/// Application state.
struct AppState {
    world: World,
    scene: Scene,
    renderer: SoftwareRenderer,
    framebuffer: Framebuffer,
    view: RenderView,
    show_grid: bool,
    paused: bool,
    show_inspector: bool,
    quit_requested: bool,
    selected: Option<BodyId>,
    contacts: BTreeMap<BodyId, usize>,
    last_stats: StepStats,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(scene: Scene, width: u32, height: u32, ticks_per_second: f64) -> Self {
        Self {
            world: World::from_scene(&scene),
            scene,
            renderer: SoftwareRenderer::new(width, height),
            framebuffer: Framebuffer::new(width, height),
            view: RenderView::default(),
            show_grid: false,
            paused: false,
            show_inspector: true,
            quit_requested: false,
            selected: None,
            contacts: BTreeMap::new(),
            last_stats: StepStats::default(),
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate: 1.0 / ticks_per_second,
        }
    }

    fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        // Fixed timestep for kernel ticking
        self.tick_accumulator += dt as f64;
        let mut ticks = 0;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            if ticks == MAX_TICKS_PER_FRAME {
                self.tick_accumulator = 0.0;
                break;
            }
            self.step_once();
            ticks += 1;
        }
    }

    fn step_once(&mut self) {
        self.last_stats = self.world.step();
        let events = self.world.drain_events();
        for (id, n) in WorldInspector::contact_counts(&events) {
            *self.contacts.entry(id).or_insert(0) += n;
        }
    }

    fn reset(&mut self) {
        self.world = World::from_scene(&self.scene);
        self.contacts.clear();
        self.last_stats = StepStats::default();
        self.tick_accumulator = 0.0;
        tracing::info!("world reset");
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.tick_accumulator = 0.0;
        tracing::info!(paused = self.paused, tick = self.world.tick(), "pause toggled");
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Space => self.toggle_pause(),
            KeyCode::KeyN if self.paused => self.step_once(),
            KeyCode::KeyR => self.reset(),
            KeyCode::Tab => self.show_inspector = !self.show_inspector,
            KeyCode::Escape => self.quit_requested = true,
            _ => {}
        }
    }

    fn draw_frame(&mut self) {
        self.view.grid = self
            .show_grid
            .then_some((20, 20, Color::rgb(220, 220, 220)));
        self.renderer
            .render_into(&self.world, &self.view, &mut self.framebuffer);
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_inspector {
            return;
        }

        let summary = WorldInspector::summary(&self.world);

        egui::SidePanel::left("inspector")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Squash");
                ui.separator();
                ui.label(format!(
                    "Tick: {}  {}",
                    summary.tick,
                    if self.paused { "(paused)" } else { "" }
                ));
                ui.label(format!(
                    "Bodies: {} ({} movable, {} squeezed)",
                    summary.body_count, summary.movable_count, summary.squeezed_count
                ));
                ui.label(format!("Kinetic energy: {:.2}", summary.kinetic_energy));
                ui.label(format!(
                    "Last step: {} pairs, {} resolutions",
                    self.last_stats.pairs_checked, self.last_stats.resolutions
                ));
                ui.separator();

                ui.heading("Controls");
                ui.horizontal(|ui| {
                    let label = if self.paused { "Resume" } else { "Pause" };
                    if ui.button(format!("{label} (Space)")).clicked() {
                        self.toggle_pause();
                    }
                    if ui
                        .add_enabled(self.paused, egui::Button::new("Step (N)"))
                        .clicked()
                    {
                        self.step_once();
                    }
                    if ui.button("Reset (R)").clicked() {
                        self.reset();
                    }
                });
                ui.checkbox(&mut self.show_grid, "Grid");

                ui.separator();
                ui.heading("Bodies");

                for id in WorldInspector::list_bodies(&self.world) {
                    let Some(body) = self.world.get(id) else {
                        continue;
                    };
                    let kind = if body.is_static() { "wall" } else { "ball" };
                    let contacts = self.contacts.get(&id).copied().unwrap_or(0);
                    let is_selected = self.selected == Some(id);
                    let label = format!("{id} {kind}  contacts: {contacts}");
                    if ui.selectable_label(is_selected, label).clicked() {
                        self.selected = if is_selected { None } else { Some(id) };
                    }
                }

                if let Some(info) = self
                    .selected
                    .and_then(|id| WorldInspector::inspect_body(&self.world, id))
                {
                    ui.separator();
                    ui.heading("Inspector");
                    ui.label(format!(
                        "Position: ({:.2}, {:.2})",
                        info.position.x, info.position.y
                    ));
                    ui.label(format!(
                        "Velocity: ({:.2}, {:.2})",
                        info.velocity.x, info.velocity.y
                    ));
                    ui.label(format!(
                        "Half extents: ({:.1}, {:.1})",
                        info.half_extents.x, info.half_extents.y
                    ));
                    ui.label(format!("Mass: {:.2}", info.mass));
                    ui.label(format!(
                        "Squeeze: {:.3} ({} ticks left)",
                        info.squeeze, info.squeeze_timer
                    ));
                    ui.label(format!("Color: {}", info.color));
                }

                ui.separator();
                ui.small("Space: Pause | N: Step | R: Reset | Tab: Inspector | Esc: Quit");
            });
    }
}

/// Everything that exists only once a window is up.
struct Gpu {
    window: Arc<Window>,
    ctx: GpuContext,
    presenter: FramePresenter,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            error: None,
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let (width, height) = (self.state.renderer.width, self.state.renderer.height);
        let attrs = Window::default_attributes()
            .with_title("Squash")
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("creating window")?,
        );

        let size = window.inner_size();
        let ctx = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))?;
        let format = ctx.config.format;

        let presenter = FramePresenter::new(&ctx.device, format, width, height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, format, None, 1, false);

        tracing::info!(?format, width, height, "GPU initialized");

        Ok(Gpu {
            window,
            ctx,
            presenter,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);
        self.state.draw_frame();

        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };
        let (device, queue) = (&gpu.ctx.device, &gpu.ctx.queue);

        gpu.presenter.upload(device, queue, &self.state.framebuffer);

        let Some(output) = gpu.ctx.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (surface_w, surface_h) = (gpu.ctx.config.width, gpu.ctx.config.height);

        gpu.presenter
            .render(device, queue, &view, surface_w, surface_h);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [surface_w, surface_h],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        gpu.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
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
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.ctx.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
                if self.state.quit_requested {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    anyhow::ensure!(
        cli.width > 0 && cli.height > 0,
        "framebuffer size must be non-zero"
    );
    anyhow::ensure!(
        cli.tick_rate.is_finite() && cli.tick_rate > 0.0,
        "tick rate must be positive"
    );

    let scene = match &cli.scene {
        Some(path) => {
            Scene::load(path).with_context(|| format!("loading scene {}", path.display()))?
        }
        None => Scene::demo(cli.width, cli.height),
    };

    tracing::info!(
        bodies = scene.bodies.len(),
        tick_rate = cli.tick_rate,
        "squash-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(scene, cli.width, cli.height, cli.tick_rate));
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
