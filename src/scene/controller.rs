use super::{Node, NodeKind, SceneGraph, SceneKey};
use crate::assets::{AssetError, AsyncLoader, LoadOutcome};
use crate::palette::{apply_palette, Palette};
use crate::render::camera::OrbitCamera;
use crate::render::frame_loop::RenderLoop;
use crate::render::resources::ResourceRegistry;
use glam::Mat4;

/// Reference to the live model. Only [`ModelController`] holds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    pub key: SceneKey,
    pub model_id: String,
}

/// Owns the "current model" and every transition of it: dispose, load, insert.
#[derive(Debug)]
pub struct ModelController {
    current: Option<ModelHandle>,
    scale_factor: f32,
}

impl ModelController {
    pub fn new(scale_factor: f32) -> Self {
        Self {
            current: None,
            scale_factor,
        }
    }

    pub fn current(&self) -> Option<&ModelHandle> {
        self.current.as_ref()
    }

    pub fn current_node<'a>(&self, scene: &'a SceneGraph) -> Option<&'a Node> {
        scene.get(self.current.as_ref()?.key)
    }

    /// Release the live model's GPU resources and pull it out of the scene.
    /// The reference is cleared first, so a second call finds nothing to release.
    pub fn dispose_current(
        &mut self,
        scene: &mut SceneGraph,
        resources: &mut ResourceRegistry,
    ) -> Option<String> {
        let handle = self.current.take()?;
        let Some(root) = scene.remove(handle.key) else {
            log::warn!("Model '{}' was already detached from the scene", handle.model_id);
            return Some(handle.model_id);
        };

        let mut released = 0usize;
        root.visit(Mat4::IDENTITY, &mut |node, _| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                for id in [mesh.geometry.handle, mesh.material.handle] {
                    match resources.release(id) {
                        Ok(_) => released += 1,
                        Err(err) => log::warn!("Skipping release: {}", err),
                    }
                }
            }
        });
        log::info!(
            "Disposed model '{}' ({} GPU resources released)",
            handle.model_id,
            released
        );
        Some(handle.model_id)
    }

    /// First half of a model swap: drop the old model, then request the new one.
    pub fn begin_load(
        &mut self,
        model_id: &str,
        scene: &mut SceneGraph,
        resources: &mut ResourceRegistry,
        loader: &mut AsyncLoader,
    ) -> u64 {
        self.dispose_current(scene, resources);
        let request = loader.request(model_id);
        log::info!("Loading model '{}' (request {})", model_id, request);
        request
    }

    /// Second half of a model swap, run when a load completes. The last completion
    /// to arrive becomes the current model. On failure the scene stays empty.
    pub fn finish_load(
        &mut self,
        outcome: LoadOutcome,
        scene: &mut SceneGraph,
        resources: &mut ResourceRegistry,
        camera: &mut OrbitCamera,
        render_loop: &mut RenderLoop,
    ) -> Result<(), AssetError> {
        let model = match outcome.result {
            Ok(model) => model,
            Err(err) => {
                log::error!("Failed to load model '{}': {}", outcome.model_id, err);
                return Err(err);
            }
        };

        // An overlapping request may have completed first; keep a single live model.
        self.dispose_current(scene, resources);

        let mut root = Node::upload(&model.root, resources);
        root.set_uniform_scale(self.scale_factor);
        let mesh_count = root.meshes().len();
        let key = scene.add(root);
        self.current = Some(ModelHandle {
            key,
            model_id: model.model_id,
        });
        log::info!(
            "Model '{}' ready (request {}, {} meshes)",
            outcome.model_id,
            outcome.request,
            mesh_count
        );

        self.fit_camera(scene, camera);
        if render_loop.start() {
            log::info!("Render loop started");
        }
        Ok(())
    }

    /// Refit the camera to the live model. Returns `false` when there is none.
    pub fn fit_camera(&self, scene: &SceneGraph, camera: &mut OrbitCamera) -> bool {
        let Some(root) = self.current_node(scene) else {
            log::debug!("Camera fit skipped: no model loaded");
            return false;
        };
        let bounds = root.world_bounds();
        camera.fit_to_bounds(&bounds);
        log::debug!(
            "Camera fit: size {:.3}, target {}, position {}",
            bounds.size().length(),
            camera.target,
            camera.position
        );
        true
    }

    /// Recolor the live model. Returns the number of meshes touched (0 with no model).
    pub fn apply_palette(&self, scene: &mut SceneGraph, palette: &Palette) -> usize {
        let Some(handle) = &self.current else {
            log::debug!("Palette ignored: no model loaded");
            return 0;
        };
        match scene.get_mut(handle.key) {
            Some(root) => apply_palette(root, palette),
            None => 0,
        }
    }
}
