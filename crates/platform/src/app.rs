//! Window, event loop and per-frame orchestration.

use std::sync::Arc;

use anyhow::{Context, Result};
use asset::{AssetRoot, ModelData, ThreadedTextureLoader, obj};
use corelib::camera::OrbitCamera;
use corelib::selection::SelectionPanel;
use corelib::turntable::Turntable;
use corelib::{Catalog, MaterialOption, ViewportController};
use renderer::GpuState;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::ViewerConfig;
use crate::input::DragTracker;
use crate::ui::{self, FpsCounter, PanelAction};

/// Fixed location of the configurable model, relative to the asset root.
pub const MODEL_PATH: &str = "/assets/shoe.obj";

/// Pixels per scroll "line" for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 50.0;

pub struct ConfiguratorApp {
    config: ViewerConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    /// CPU model, handed to the GPU once the window exists.
    model: Option<ModelData>,
    controller: ViewportController<ThreadedTextureLoader>,
    panel: SelectionPanel,
    orbit: OrbitCamera,
    drag: DragTracker,
    /// Appearance revision currently bound on the GPU.
    bound_revision: Option<u64>,
    fps: FpsCounter,

    /// Set when startup fails inside the event loop.
    fatal: Option<anyhow::Error>,
}

impl ConfiguratorApp {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let root = AssetRoot::new(&config.assets);
        let model = load_model(&root);
        // Conservative until the device reports its own limit.
        let limit = wgpu::Limits::downlevel_webgl2_defaults().max_texture_dimension_2d;
        let loader = ThreadedTextureLoader::spawn(root, limit)?;
        let controller =
            ViewportController::with_turntable(loader, Turntable::new(config.spin_rate));

        Ok(Self {
            config,
            window: None,
            gpu: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,
            egui_renderer: None,
            model: Some(model),
            controller,
            panel: SelectionPanel::new(Catalog::default()),
            orbit: OrbitCamera::default(),
            drag: DragTracker::default(),
            bound_revision: None,
            fps: FpsCounter::new(),
            fatal: None,
        })
    }

    /// Startup error raised inside the event loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.fatal.take()
    }

    fn initialize_graphics(&mut self, window: Arc<Window>) -> Result<()> {
        let model = self.model.take().unwrap_or_else(ModelData::placeholder);
        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.config.backends,
            &model,
        ))?;

        self.controller
            .loader_mut()
            .set_max_dimension(gpu.max_texture_dimension());

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(gpu.device(), gpu.surface_format(), None, 1, false);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn apply(&mut self, action: PanelAction) {
        let catalog = self.panel.catalog();
        let option = match action {
            PanelAction::Texture(i) => catalog
                .textures()
                .get(i)
                .cloned()
                .map(MaterialOption::Texture),
            PanelAction::Color(i) => catalog
                .colors()
                .get(i)
                .cloned()
                .map(MaterialOption::Color),
            PanelAction::Reset => {
                self.controller.reset();
                return;
            }
        };
        match option {
            Some(option) => {
                log::info!("Selected {}", option.display_name());
                self.panel.on_chosen(&option, &mut self.controller);
            }
            None => log::warn!("Ignoring {action:?}: no such catalog entry"),
        }
    }

    fn pointer_over_ui(&self) -> bool {
        self.egui_ctx.is_pointer_over_area() || self.egui_ctx.wants_pointer_input()
    }

    fn handle_mouse_button(&mut self, state: ElementState, consumed: bool) {
        match state {
            ElementState::Pressed => {
                if !consumed && !self.pointer_over_ui() && self.drag.press() {
                    self.controller.turntable_mut().pointer_down();
                }
            }
            ElementState::Released => self.end_drag(),
        }
    }

    fn end_drag(&mut self) {
        if self.drag.release() {
            self.controller.turntable_mut().pointer_up();
        }
    }

    fn render_frame(&mut self) {
        // Settle finished loads, then rebind if the appearance moved on.
        self.controller.poll();
        let revision = self.controller.revision();
        if self.bound_revision != Some(revision) {
            if let Some(gpu) = &mut self.gpu {
                gpu.bind_appearance(self.controller.appearance());
                self.bound_revision = Some(revision);
            }
        }
        self.controller.advance_frame();
        let fps = self.fps.tick();

        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else { return };

        let raw_input = egui_state.take_egui_input(window);
        let panel = &self.panel;
        let appearance = self.controller.appearance();
        let status = self.controller.status();
        let show_fps = self.config.show_fps;
        let mut action = None;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            action = ui::draw_panel(ctx, panel, appearance, status);
            if show_fps {
                ui::draw_fps(ctx, fps);
            }
        });
        egui_state.handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, pixels_per_point);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        // Texture uploads must not be lost when the frame is skipped.
        for (id, delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(gpu.device(), gpu.queue(), *id, delta);
        }

        match gpu.begin_frame() {
            Ok(Some(mut frame)) => {
                gpu.draw_model(
                    &mut frame,
                    &self.orbit.camera(gpu.aspect()),
                    self.controller.turntable().angle(),
                );

                let (width, height) = gpu.size();
                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [width, height],
                    pixels_per_point,
                };
                let ui_buffers = egui_renderer.update_buffers(
                    gpu.device(),
                    gpu.queue(),
                    &mut frame.encoder,
                    &paint_jobs,
                    &screen_descriptor,
                );
                ui::render_egui(
                    egui_renderer,
                    &mut frame.encoder,
                    &frame.view,
                    &paint_jobs,
                    &screen_descriptor,
                );
                gpu.end_frame(frame, ui_buffers);
            }
            Ok(None) => {}
            Err(e) => log::error!("Frame failed: {e:#}"),
        }

        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        if let Some(action) = action {
            self.apply(action);
        }
    }
}

/// Load the model, falling back to the placeholder so the viewer stays usable.
fn load_model(root: &AssetRoot) -> ModelData {
    let loaded = root
        .resolve(MODEL_PATH)
        .and_then(|path| obj::load_obj_from_path(&path).with_context(|| format!("{path:?}")));
    match loaded {
        Ok(model) => {
            log::info!(
                "Loaded model {MODEL_PATH}: {} surfaces, {} triangles",
                model.surfaces.len(),
                model.triangle_count()
            );
            model
        }
        Err(e) => {
            log::error!("Failed to load model {MODEL_PATH}, showing placeholder: {e:#}");
            ModelData::placeholder()
        }
    }
}

impl ApplicationHandler for ConfiguratorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("Shoe Configurator")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let result = event_loop
            .create_window(attrs)
            .context("Failed to create window")
            .and_then(|window| {
                let window = Arc::new(window);
                log::info!(
                    "Window created: {}x{}",
                    window.inner_size().width,
                    window.inner_size().height
                );
                self.initialize_graphics(window)
            });

        if let Err(e) = result {
            log::error!("Startup failed: {e:#}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // egui sees everything first; consumed input doesn't reach the viewport.
        let consumed = match (&mut self.egui_state, &self.window) {
            (Some(state), Some(window)) => state.on_window_event(window, &event).consumed,
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized: {}x{}", size.width, size.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.handle_mouse_button(state, consumed),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((dx, dy)) = self.drag.cursor_moved(position.x as f32, position.y as f32)
                {
                    self.orbit.orbit(dx, dy);
                }
            }
            WindowEvent::CursorLeft { .. } => self.drag.cursor_left(),
            WindowEvent::Focused(false) => self.end_drag(),
            WindowEvent::MouseWheel { delta, .. } => {
                if !consumed && !self.pointer_over_ui() {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                    };
                    self.orbit.zoom(lines);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
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

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    #[test]
    fn missing_model_falls_back_to_placeholder() {
        let model = load_model(&AssetRoot::new("/nonexistent/configurator"));
        assert_eq!(model, ModelData::placeholder());
    }

    fn test_app() -> ConfiguratorApp {
        let config = ViewerConfig {
            assets: PathBuf::from("/nonexistent/configurator"),
            ..ViewerConfig::default()
        };
        ConfiguratorApp::new(config).expect("app")
    }

    #[test]
    fn panel_actions_reach_the_controller() {
        let mut app = test_app();
        app.apply(PanelAction::Color(1));
        assert_eq!(
            app.controller.appearance().active_color(),
            Some(corelib::ColorValue::from_hex(0x0000FF))
        );

        app.apply(PanelAction::Texture(0));
        assert_eq!(app.controller.status(), corelib::LoadStatus::Loading);
        assert!(app.controller.appearance().is_neutral());

        app.apply(PanelAction::Reset);
        assert_eq!(app.controller.status(), corelib::LoadStatus::Idle);
    }

    #[test]
    fn out_of_range_action_is_ignored() {
        let mut app = test_app();
        let before = app.controller.latest_token();
        app.apply(PanelAction::Color(99));
        assert_eq!(app.controller.latest_token(), before);
    }

    #[test]
    fn bundled_model_has_sole_and_upper() {
        let repo = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let model = load_model(&AssetRoot::new(repo));
        let names: Vec<&str> = model.surfaces.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["sole", "upper"]);
    }
}
