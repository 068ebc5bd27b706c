mod input;
mod overlay;
mod timing;
pub mod viewer;

use overlay::{Overlay, OverlayAction, OverlayView};
use viewer::Viewer;

use crate::assets::GltfDirectorySource;
use crate::config::{ConfigError, ViewerConfig};
use crate::palette::swatch::export_surfaces;
use crate::palette::{PaletteError, PaletteSet};
use crate::render::gpu::GpuPresenter;
use input::{map_key, InputAction, PointerState};
use timing::FrameTiming;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuPresenter>,
    overlay: Option<Overlay>,
    config: ViewerConfig,
    viewer: Viewer,
    pointer: PointerState,
    timing: FrameTiming,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(config: ViewerConfig, viewer: Viewer) -> Self {
        let timing = FrameTiming::new(config.window.title.clone());
        Self {
            window: None,
            gpu: None,
            overlay: None,
            config,
            viewer,
            pointer: PointerState::default(),
            timing,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::SelectModel(slot) => {
                if let Err(err) = self.viewer.select_model_slot(slot) {
                    log::warn!("{}", err);
                }
            }
            InputAction::ApplyPalette(index) => {
                if let Err(err) = self.viewer.apply_palette(index) {
                    log::warn!("{}", err);
                }
            }
            InputAction::RefitCamera => {
                self.viewer.refit_camera();
            }
            InputAction::Quit => {
                log::info!("Escape pressed, shutting down...");
                event_loop.exit();
            }
        }
    }

    fn render(&mut self) {
        let (Some(window), Some(gpu), Some(overlay)) =
            (self.window.clone(), self.gpu.as_mut(), self.overlay.as_mut())
        else {
            return;
        };

        // The scene advances only while the render loop runs; the overlay always draws.
        let frame = self.viewer.tick();
        let view = OverlayView {
            frame: frame.as_ref(),
            panel: self.viewer.swatch_panel(),
            catalog: self.viewer.catalog(),
            current: self.viewer.current_model().map(|handle| handle.model_id.as_str()),
            mesh_count: self.viewer.mesh_count(),
            loading: self.viewer.loads_in_flight() > 0,
        };
        let (overlay_frame, actions) = overlay.run(&window, &view);
        let background = frame
            .as_ref()
            .map_or_else(|| self.viewer.clear_color(), |frame| frame.background);
        if let Err(err) = gpu.present(background, &overlay_frame) {
            log::error!("Present failed: {}", err);
        }

        if let Some(frame) = &frame {
            self.timing.update(
                Some(window.as_ref()),
                Instant::now(),
                self.viewer.current_label(),
                frame.draws.len(),
            );
            log::trace!(
                "Frame: {} draws, camera at {} ({:.2} from target)",
                frame.draws.len(),
                frame.camera_position,
                self.viewer.camera().distance()
            );
        }

        for action in actions {
            match action {
                OverlayAction::SelectModel(model_id) => {
                    if let Err(err) = self.viewer.select_model(&model_id) {
                        log::warn!("{}", err);
                    }
                }
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = match GpuPresenter::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(err) => {
                log::error!("Failed to initialize GPU output: {}", err);
                event_loop.exit();
                return;
            }
        };
        self.overlay = Some(Overlay::new(&window, self.viewer.swatch_surfaces()));
        self.gpu = Some(gpu);

        self.viewer.resize(size.width, size.height);
        self.update_target_frame_duration(&window);
        self.window = Some(window);

        let initial = self.config.catalog.initial.clone();
        if let Err(err) = self.viewer.select_model(&initial) {
            log::warn!("Initial model: {}", err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&self.window, self.overlay.as_mut()) {
            (Some(window), Some(overlay)) => overlay.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !consumed && event.state == ElementState::Pressed && !event.repeat {
                    if let Some(action) = map_key(event.physical_key) {
                        self.handle_action(action, event_loop);
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                log::debug!("Window resized to {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.viewer.resize(new_size.width, new_size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta = self
                    .pointer
                    .cursor_moved(position.x as f32, position.y as f32);
                if let (Some((dx, dy)), false) = (delta, consumed) {
                    self.viewer.orbit(dx, dy);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.cursor_left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                // Always track the button so a drag that ends over the overlay is released.
                let clicked = self.pointer.button(button, pressed);
                if let (Some((x, y)), false) = (clicked, consumed) {
                    if let Some(index) = self.viewer.click(x, y) {
                        log::debug!("Swatch {} clicked", index);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !consumed {
                    let steps = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                    };
                    self.viewer.zoom(steps);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.viewer.pump_loads();

        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::debug!("Render loop {:?} at exit", self.viewer.render_loop().state());
        self.viewer.stop_render_loop();
        log::info!(
            "{} scene roots, {} live / {} released GPU resources, {} loads still in flight",
            self.viewer.scene().len(),
            self.viewer.resources().live_count(),
            self.viewer.resources().released_count(),
            self.viewer.loads_in_flight()
        );
    }
}

pub fn run(config_path: Option<PathBuf>) -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("swatchview {}", env!("CARGO_PKG_VERSION"));
    log::info!("   Pick a model from the list (or 1-4), click a swatch (or F1-F3), ESC to exit");

    let config = ViewerConfig::resolve(config_path.as_deref())?;
    let palettes = PaletteSet::load_or_default(config.palettes_path.as_ref())?;
    let source = Arc::new(GltfDirectorySource::new(config.asset_dir.clone()));
    let viewer = Viewer::new(&config, palettes, source);

    if let Some(dir) = &config.swatch_export_dir {
        let written = export_surfaces(dir, viewer.swatch_surfaces())?;
        log::info!("Wrote {} swatch images to {}", written.len(), dir.display());
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, viewer);
    event_loop.run_app(&mut app)?;

    log::info!("Goodbye!");
    Ok(())
}
