use super::{AssetError, MeshData, ModelData, ModelSource, NodeData};
use crate::scene::Aabb;
use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};

/// Resolves model ids as file names under one asset directory.
#[derive(Debug, Clone)]
pub struct GltfDirectorySource {
    root: PathBuf,
}

impl GltfDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, model_id: &str) -> PathBuf {
        self.root.join(model_id)
    }
}

impl ModelSource for GltfDirectorySource {
    fn fetch(&self, model_id: &str) -> Result<ModelData, AssetError> {
        load_model_file(model_id, &self.path_for(model_id))
    }
}

/// Parse a `.glb`/`.gltf` file into a node tree.
///
/// The default scene (or the first one) becomes a group root. A glTF mesh with a
/// single primitive turns its node into a mesh node; a mesh with several
/// primitives becomes a group with one mesh child per primitive, ahead of the
/// node's own children.
pub fn load_model_file(model_id: &str, path: &Path) -> Result<ModelData, AssetError> {
    if !path.is_file() {
        return Err(AssetError::NotFound {
            path: path.display().to_string(),
        });
    }
    let (document, _buffers, _images) =
        gltf::import(path).map_err(|source| AssetError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene {
            path: path.display().to_string(),
        })?;

    let mut root = NodeData::group(scene.name().unwrap_or("Scene"), Mat4::IDENTITY);
    root.children = scene.nodes().map(|node| convert_node(&node)).collect();
    Ok(ModelData {
        model_id: model_id.to_string(),
        root,
    })
}

fn convert_node(node: &gltf::Node<'_>) -> NodeData {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let mut data = NodeData::group(name.clone(), transform);

    if let Some(mesh) = node.mesh() {
        let mut primitives: Vec<MeshData> = mesh
            .primitives()
            .map(|primitive| convert_primitive(&primitive))
            .collect();
        if primitives.len() == 1 {
            data.mesh = primitives.pop();
        } else {
            for (index, primitive) in primitives.into_iter().enumerate() {
                data.children.push(NodeData {
                    name: format!("{name}_{index}"),
                    transform: Mat4::IDENTITY,
                    mesh: Some(primitive),
                    children: Vec::new(),
                });
            }
        }
    }

    data.children
        .extend(node.children().map(|child| convert_node(&child)));
    data
}

fn convert_primitive(primitive: &gltf::Primitive<'_>) -> MeshData {
    let bounds = primitive.bounding_box();
    let vertex_count = primitive
        .get(&gltf::Semantic::Positions)
        .map(|accessor| accessor.count())
        .unwrap_or(0);
    let pbr = primitive.material().pbr_metallic_roughness();
    let base_color_texture = pbr.base_color_texture().map(|info| {
        let texture = info.texture();
        texture
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("texture_{}", texture.index()))
    });

    MeshData {
        bounds: Aabb::new(Vec3::from(bounds.min), Vec3::from(bounds.max)),
        vertex_count,
        base_color: pbr.base_color_factor(),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        base_color_texture,
    }
}
