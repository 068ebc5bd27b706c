use crate::assets::{AsyncLoader, LoadOutcome, ModelCatalog, ModelSource};
use crate::config::ViewerConfig;
use crate::palette::swatch::render_surfaces;
use crate::palette::{PaletteSet, SwatchPanel};
use crate::render::{
    prepare_frame, FrameDesc, OrbitCamera, RenderLoop, RenderSettings, ResourceRegistry,
};
use crate::scene::{ModelController, ModelHandle, Node, SceneGraph};
use image::RgbaImage;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("palette {index} does not exist ({count} available)")]
    UnknownPalette { index: usize, count: usize },
    #[error("model '{0}' is not in the catalog")]
    UnknownModel(String),
}

/// All viewer state, driven by a single thread. The windowed shell forwards
/// user input here and asks for one frame per render tick.
pub struct Viewer {
    catalog: ModelCatalog,
    palettes: PaletteSet,
    swatch_surfaces: Vec<RgbaImage>,
    swatch_panel: SwatchPanel,
    render_settings: RenderSettings,
    scene: SceneGraph,
    resources: ResourceRegistry,
    camera: OrbitCamera,
    controller: ModelController,
    loader: AsyncLoader,
    render_loop: RenderLoop,
    viewport_height: f32,
}

impl Viewer {
    pub fn new(
        config: &ViewerConfig,
        palettes: PaletteSet,
        source: Arc<dyn ModelSource>,
    ) -> Self {
        let swatch_surfaces = render_surfaces(palettes.iter(), &config.swatches);
        let swatch_panel = SwatchPanel::new(config.swatches, palettes.len());
        let aspect = config.window.width.max(1) as f32 / config.window.height.max(1) as f32;
        Self {
            catalog: config.catalog.clone(),
            palettes,
            swatch_surfaces,
            swatch_panel,
            render_settings: config.render,
            scene: SceneGraph::new(),
            resources: ResourceRegistry::new(),
            camera: OrbitCamera::from_config(&config.camera, aspect),
            controller: ModelController::new(config.model_scale),
            loader: AsyncLoader::new(source),
            render_loop: RenderLoop::new(),
            viewport_height: config.window.height.max(1) as f32,
        }
    }

    /// Start swapping to `model_id`. The old model is gone once this returns.
    pub fn select_model(&mut self, model_id: &str) -> Result<u64, ViewerError> {
        if !self.catalog.contains(model_id) {
            return Err(ViewerError::UnknownModel(model_id.to_string()));
        }
        Ok(self.controller.begin_load(
            model_id,
            &mut self.scene,
            &mut self.resources,
            &mut self.loader,
        ))
    }

    pub fn select_model_slot(&mut self, slot: usize) -> Result<u64, ViewerError> {
        let model_id = self
            .catalog
            .file_at(slot)
            .ok_or_else(|| ViewerError::UnknownModel(format!("#{slot}")))?
            .to_string();
        self.select_model(&model_id)
    }

    /// Apply every load that has completed, in arrival order. Returns how many landed.
    pub fn pump_loads(&mut self) -> usize {
        let mut landed = 0;
        for outcome in self.loader.poll() {
            if self.finish(outcome) {
                landed += 1;
            }
        }
        landed
    }

    /// Block for the next completion and apply it. `false` on timeout or failed load.
    #[cfg(test)]
    pub fn wait_for_load(&mut self, timeout: std::time::Duration) -> bool {
        match self.loader.wait(timeout) {
            Some(outcome) => self.finish(outcome),
            None => false,
        }
    }

    fn finish(&mut self, outcome: LoadOutcome) -> bool {
        self.controller
            .finish_load(
                outcome,
                &mut self.scene,
                &mut self.resources,
                &mut self.camera,
                &mut self.render_loop,
            )
            .is_ok()
    }

    /// Recolor the current model with palette `index`; a no-op with no model loaded.
    pub fn apply_palette(&mut self, index: usize) -> Result<usize, ViewerError> {
        let palette = self
            .palettes
            .get(index)
            .ok_or(ViewerError::UnknownPalette {
                index,
                count: self.palettes.len(),
            })?;
        let touched = self.controller.apply_palette(&mut self.scene, palette);
        if touched > 0 {
            log::info!("Applied palette {} to {} meshes", index, touched);
        }
        Ok(touched)
    }

    /// Route a click in window pixels to a swatch surface, if it hit one.
    pub fn click(&mut self, x: f32, y: f32) -> Option<usize> {
        let index = self.swatch_panel.hit_test(x, y)?;
        match self.apply_palette(index) {
            Ok(_) => Some(index),
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }

    pub fn refit_camera(&mut self) -> bool {
        self.controller.fit_camera(&self.scene, &mut self.camera)
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.camera.rotate_by_pixels(dx, dy, self.viewport_height);
    }

    pub fn zoom(&mut self, steps: f32) {
        self.camera.zoom(steps);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    /// One render tick: advance controls and build the frame. `None` while the loop
    /// is not running.
    pub fn tick(&mut self) -> Option<FrameDesc> {
        if !self.render_loop.tick() {
            return None;
        }
        self.camera.update();
        Some(prepare_frame(&self.scene, &self.camera, &self.render_settings))
    }

    pub fn stop_render_loop(&mut self) {
        self.render_loop.stop();
        log::info!("Render loop stopped after {} frames", self.render_loop.frames());
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn current_model(&self) -> Option<&ModelHandle> {
        self.controller.current()
    }

    /// Dropdown label of the live model, falling back to its asset id.
    pub fn current_label(&self) -> Option<&str> {
        let model_id = self.current_model()?.model_id.as_str();
        Some(self.catalog.label_of(model_id).unwrap_or(model_id))
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.controller.current_node(&self.scene)
    }

    pub fn mesh_count(&self) -> usize {
        self.current_node().map_or(0, |root| root.meshes().len())
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn swatch_panel(&self) -> &SwatchPanel {
        &self.swatch_panel
    }

    /// Background as linear RGBA, for clearing the window before a scene frame exists.
    pub fn clear_color(&self) -> [f32; 4] {
        let [r, g, b] = self.render_settings.background.to_linear();
        [r, g, b, 1.0]
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn swatch_surfaces(&self) -> &[RgbaImage] {
        &self.swatch_surfaces
    }

    pub fn loads_in_flight(&self) -> usize {
        self.loader.in_flight()
    }
}
