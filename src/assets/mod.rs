pub mod catalog;
pub mod gltf_source;
pub mod loader;

pub use catalog::{ModelCatalog, ModelEntry};
pub use gltf_source::GltfDirectorySource;
pub use loader::{AsyncLoader, LoadOutcome};

use crate::scene::Aabb;
use glam::Mat4;

/// CPU-side model as produced by a [`ModelSource`], before any GPU upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub model_id: String,
    pub root: NodeData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub name: String,
    pub transform: Mat4,
    pub mesh: Option<MeshData>,
    pub children: Vec<NodeData>,
}

impl NodeData {
    pub fn group(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn mesh_count(&self) -> usize {
        usize::from(self.mesh.is_some())
            + self.children.iter().map(NodeData::mesh_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Local-space bounds of the vertex positions.
    pub bounds: Aabb,
    pub vertex_count: usize,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub base_color_texture: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("model asset not found: {path}")]
    NotFound { path: String },
    #[error("failed to parse glTF at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF at {path} contains no scene")]
    NoScene { path: String },
    #[error("failed to spawn loader thread for {model_id}: {source}")]
    Spawn {
        model_id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fetches and parses a model asset by identifier. Called off the main thread.
pub trait ModelSource: Send + Sync {
    fn fetch(&self, model_id: &str) -> Result<ModelData, AssetError>;
}
