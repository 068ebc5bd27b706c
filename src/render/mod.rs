pub mod camera;
pub mod frame_loop;
pub mod gpu;
pub mod preview;
pub mod resources;

pub use camera::{CameraConfig, OrbitCamera};
pub use frame_loop::RenderLoop;
pub use resources::{ResourceId, ResourceRegistry};

use crate::palette::Rgb;
use crate::scene::{Aabb, NodeKind, SceneGraph};
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    None,
    AcesFilmic,
}

/// Image-based lighting source for the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    None,
    Room,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub background: Rgb,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    pub srgb_output: bool,
    pub environment: Environment,
    pub antialias: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: Rgb::from_hex(0xbbbbbb),
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            srgb_output: true,
            environment: Environment::Room,
            antialias: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub world: Mat4,
    /// Local-space bounds of the geometry.
    pub bounds: Aabb,
    pub geometry: ResourceId,
    pub material: ResourceId,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

/// Everything the render engine needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDesc {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub background: [f32; 4],
    pub settings: RenderSettings,
    pub draws: Vec<DrawItem>,
}

/// Flatten the scene into a draw list, meshes in traversal order.
pub fn prepare_frame(
    scene: &SceneGraph,
    camera: &OrbitCamera,
    settings: &RenderSettings,
) -> FrameDesc {
    let mut draws = Vec::new();
    for root in scene.roots() {
        root.visit(Mat4::IDENTITY, &mut |node, world| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                draws.push(DrawItem {
                    world,
                    bounds: mesh.geometry.bounds,
                    geometry: mesh.geometry.handle,
                    material: mesh.material.handle,
                    base_color: mesh.material.base_color,
                    metallic: mesh.material.metallic,
                    roughness: mesh.material.roughness,
                });
            }
        });
    }
    let [r, g, b] = settings.background.to_linear();
    FrameDesc {
        view: camera.view_matrix(),
        projection: camera.projection_matrix(),
        camera_position: camera.position,
        background: [r, g, b, 1.0],
        settings: *settings,
        draws,
    }
}
