pub mod controller;

pub use controller::{ModelController, ModelHandle};

use crate::assets::NodeData;
use crate::palette::Rgb;
use crate::render::resources::{ResourceId, ResourceKind, ResourceRegistry};
use glam::{Mat4, Vec3};

/// Axis-aligned bounding box. An empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn extend_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Box enclosing all eight transformed corners.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.extend_point(matrix.transform_point3(corner));
        }
        out
    }

    /// Extent vector; zero for an empty box.
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub handle: ResourceId,
    pub bounds: Aabb,
    pub vertex_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub handle: ResourceId,
    /// Linear RGBA.
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub base_color_texture: Option<String>,
}

impl Material {
    /// Replace the RGB part of the base color; alpha and every other property stay.
    pub fn set_base_color(&mut self, color: Rgb) {
        let [r, g, b] = color.to_linear();
        self.base_color = [r, g, b, self.base_color[3]];
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Mat4,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn group(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, transform: Mat4, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            transform,
            kind: NodeKind::Mesh(mesh),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Build the runtime tree, allocating one geometry and one material per mesh node.
    pub fn upload(data: &NodeData, resources: &mut ResourceRegistry) -> Self {
        let node = match &data.mesh {
            Some(mesh) => Node::mesh(
                data.name.clone(),
                data.transform,
                Mesh {
                    geometry: Geometry {
                        handle: resources.allocate(ResourceKind::Geometry),
                        bounds: mesh.bounds,
                        vertex_count: mesh.vertex_count,
                    },
                    material: Material {
                        handle: resources.allocate(ResourceKind::Material),
                        base_color: mesh.base_color,
                        metallic: mesh.metallic,
                        roughness: mesh.roughness,
                        base_color_texture: mesh.base_color_texture.clone(),
                    },
                },
            ),
            None => Node::group(data.name.clone(), data.transform),
        };
        data.children.iter().fold(node, |node, child| {
            node.with_child(Node::upload(child, resources))
        })
    }

    /// Set the uniform scale of this node's local transform, keeping rotation and translation.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        let (_, rotation, translation) = self.transform.to_scale_rotation_translation();
        self.transform =
            Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, translation);
    }

    /// Depth-first pre-order walk with each node's world matrix.
    pub fn visit<'a, F>(&'a self, parent: Mat4, visitor: &mut F)
    where
        F: FnMut(&'a Node, Mat4),
    {
        let world = parent * self.transform;
        visitor(self, world);
        for child in &self.children {
            child.visit(world, visitor);
        }
    }

    /// Pre-order walk over mesh nodes only.
    pub fn for_each_mesh_mut<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(&mut Mesh),
    {
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            visitor(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(visitor);
        }
    }

    pub fn meshes(&self) -> Vec<&Mesh> {
        let mut meshes = Vec::new();
        self.visit(Mat4::IDENTITY, &mut |node, _| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                meshes.push(mesh);
            }
        });
        meshes
    }

    /// World-space bounds of every mesh in the subtree, this node's transform included.
    pub fn world_bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        self.visit(Mat4::IDENTITY, &mut |node, world| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                bounds.union(&mesh.geometry.bounds.transformed(&world));
            }
        });
        bounds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneKey(u64);

/// Scene container. Roots are drawn in insertion order.
pub struct SceneGraph {
    next_key: u64,
    roots: Vec<(SceneKey, Node)>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            next_key: 1,
            roots: Vec::new(),
        }
    }

    pub fn add(&mut self, node: Node) -> SceneKey {
        let key = SceneKey(self.next_key);
        self.next_key += 1;
        self.roots.push((key, node));
        key
    }

    pub fn remove(&mut self, key: SceneKey) -> Option<Node> {
        let index = self.roots.iter().position(|(existing, _)| *existing == key)?;
        Some(self.roots.remove(index).1)
    }

    pub fn get(&self, key: SceneKey) -> Option<&Node> {
        self.roots
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, key: SceneKey) -> Option<&mut Node> {
        self.roots
            .iter_mut()
            .find(|(existing, _)| *existing == key)
            .map(|(_, node)| node)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Aabb, Geometry, Material, Mesh, Node, NodeKind, SceneGraph};
    use crate::palette::Rgb;
    use crate::render::resources::{ResourceKind, ResourceRegistry};
    use glam::{Mat4, Vec3};

    pub(crate) fn unit_mesh(resources: &mut ResourceRegistry, name: &str, at: Vec3) -> Node {
        Node::mesh(
            name,
            Mat4::from_translation(at),
            Mesh {
                geometry: Geometry {
                    handle: resources.allocate(ResourceKind::Geometry),
                    bounds: Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
                    vertex_count: 24,
                },
                material: Material {
                    handle: resources.allocate(ResourceKind::Material),
                    base_color: [1.0, 1.0, 1.0, 0.5],
                    metallic: 0.25,
                    roughness: 0.75,
                    base_color_texture: Some("albedo".to_string()),
                },
            },
        )
    }

    #[test]
    fn empty_box_has_zero_size_and_center() {
        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::EMPTY.size(), Vec3::ZERO);
        assert_eq!(Aabb::EMPTY.center(), Vec3::ZERO);
        assert!(Aabb::EMPTY.transformed(&Mat4::from_scale(Vec3::splat(2.0))).is_empty());
    }

    #[test]
    fn transformed_box_encloses_rotated_corners() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let rotated = bounds.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let half_diagonal = 2.0f32.sqrt();
        assert!((rotated.max.x - half_diagonal).abs() < 1e-5);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn world_bounds_follow_nested_transforms() {
        let mut resources = ResourceRegistry::new();
        let root = Node::group("root", Mat4::from_scale(Vec3::splat(10.0))).with_child(
            Node::group("offset", Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)))
                .with_child(unit_mesh(&mut resources, "a", Vec3::ZERO)),
        );
        let bounds = root.world_bounds();
        assert_eq!(bounds.min, Vec3::new(5.0, -5.0, -5.0));
        assert_eq!(bounds.max, Vec3::new(15.0, 5.0, 5.0));
        assert_eq!(bounds.center(), Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn visit_is_depth_first_pre_order() {
        let mut resources = ResourceRegistry::new();
        let root = Node::group("root", Mat4::IDENTITY)
            .with_child(
                Node::group("left", Mat4::IDENTITY)
                    .with_child(unit_mesh(&mut resources, "left.0", Vec3::ZERO))
                    .with_child(unit_mesh(&mut resources, "left.1", Vec3::ZERO)),
            )
            .with_child(unit_mesh(&mut resources, "right", Vec3::ZERO));
        let mut order = Vec::new();
        root.visit(Mat4::IDENTITY, &mut |node, _| order.push(node.name.as_str()));
        assert_eq!(order, ["root", "left", "left.0", "left.1", "right"]);
        assert_eq!(root.meshes().len(), 3);
    }

    #[test]
    fn uniform_scale_keeps_translation() {
        let mut node = Node::group("root", Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        node.set_uniform_scale(10.0);
        let (scale, _, translation) = node.transform.to_scale_rotation_translation();
        assert!((scale - Vec3::splat(10.0)).length() < 1e-4);
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn base_color_update_preserves_other_properties() {
        let mut resources = ResourceRegistry::new();
        let mut node = unit_mesh(&mut resources, "a", Vec3::ZERO);
        let NodeKind::Mesh(mesh) = &mut node.kind else {
            panic!("expected mesh");
        };
        mesh.material.set_base_color(Rgb::new(255, 0, 0));
        let [r, g, b, a] = mesh.material.base_color;
        assert!((r - 1.0).abs() < 1e-5);
        assert_eq!((g, b, a), (0.0, 0.0, 0.5));
        assert_eq!(mesh.material.metallic, 0.25);
        assert_eq!(mesh.material.roughness, 0.75);
        assert_eq!(mesh.material.base_color_texture.as_deref(), Some("albedo"));
    }

    #[test]
    fn scene_graph_add_remove() {
        let mut scene = SceneGraph::new();
        let a = scene.add(Node::group("a", Mat4::IDENTITY));
        let b = scene.add(Node::group("b", Mat4::IDENTITY));
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.remove(a).map(|node| node.name), Some("a".to_string()));
        assert!(scene.remove(a).is_none());
        assert!(scene.get(b).is_some());
        assert_eq!(scene.len(), 1);
    }
}
