use super::Palette;
use crate::scene::{Mesh, Node};

/// Recolor every mesh under `root` in pre-order: mesh `k` gets `palette[k mod len]`.
/// Group nodes are skipped and do not advance the counter. Returns the mesh count.
pub fn apply_palette(root: &mut Node, palette: &Palette) -> usize {
    let mut mesh_index = 0usize;
    root.for_each_mesh_mut(&mut |mesh: &mut Mesh| {
        mesh.material.set_base_color(palette.color_wrapping(mesh_index));
        mesh_index += 1;
    });
    mesh_index
}

#[cfg(test)]
mod tests {
    use super::apply_palette;
    use crate::palette::{Palette, PaletteSet, Rgb};
    use crate::render::resources::ResourceRegistry;
    use crate::scene::tests::unit_mesh;
    use crate::scene::{Node, NodeKind};
    use glam::{Mat4, Vec3};

    fn model_with_meshes(count: usize, resources: &mut ResourceRegistry) -> Node {
        // Alternate flat meshes with meshes nested under groups.
        let mut root = Node::group("root", Mat4::IDENTITY);
        for i in 0..count {
            let mesh = unit_mesh(resources, &format!("mesh{i}"), Vec3::ZERO);
            if i % 2 == 0 {
                root = root.with_child(mesh);
            } else {
                let group = Node::group(format!("group{i}"), Mat4::IDENTITY).with_child(mesh);
                root = root.with_child(group);
            }
        }
        root
    }

    fn colors(root: &Node) -> Vec<[f32; 4]> {
        root.meshes()
            .into_iter()
            .map(|mesh| mesh.material.base_color)
            .collect()
    }

    fn with_alpha(color: Rgb, alpha: f32) -> [f32; 4] {
        let [r, g, b] = color.to_linear();
        [r, g, b, alpha]
    }

    #[test]
    fn wraps_around_when_meshes_outnumber_colors() {
        let mut resources = ResourceRegistry::new();
        let mut root = model_with_meshes(10, &mut resources);
        let palettes = PaletteSet::default();
        let palette = palettes.get(1).unwrap();

        assert_eq!(apply_palette(&mut root, palette), 10);
        let colors = colors(&root);
        for (k, color) in colors.iter().enumerate() {
            assert_eq!(*color, with_alpha(palette.colors()[k % 8], 0.5));
        }
        assert_eq!(colors[8], with_alpha(palette.colors()[0], 0.5));
        assert_eq!(colors[9], with_alpha(palette.colors()[1], 0.5));
    }

    #[test]
    fn modulus_follows_palette_length() {
        let mut resources = ResourceRegistry::new();
        let mut root = model_with_meshes(5, &mut resources);
        let palette = Palette::new(vec![Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]).unwrap();
        apply_palette(&mut root, &palette);
        let colors = colors(&root);
        assert_eq!(colors[0], colors[2]);
        assert_eq!(colors[2], colors[4]);
        assert_eq!(colors[1], colors[3]);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn reapplying_is_idempotent_and_switching_overwrites() {
        let mut resources = ResourceRegistry::new();
        let mut root = model_with_meshes(6, &mut resources);
        let palettes = PaletteSet::default();

        apply_palette(&mut root, palettes.get(0).unwrap());
        let first = root.clone();
        apply_palette(&mut root, palettes.get(0).unwrap());
        assert_eq!(root, first);

        apply_palette(&mut root, palettes.get(2).unwrap());
        let mut fresh = model_with_meshes(6, &mut ResourceRegistry::new());
        apply_palette(&mut fresh, palettes.get(2).unwrap());
        assert_eq!(colors(&root), colors(&fresh));
    }

    #[test]
    fn groups_are_left_untouched() {
        let mut resources = ResourceRegistry::new();
        let mut root = model_with_meshes(4, &mut resources);
        let before: Vec<(String, Mat4, bool)> = collect_groups(&root);
        apply_palette(&mut root, PaletteSet::default().get(0).unwrap());
        assert_eq!(collect_groups(&root), before);
        assert!(root.children.iter().any(|child| matches!(child.kind, NodeKind::Group)));
    }

    fn collect_groups(root: &Node) -> Vec<(String, Mat4, bool)> {
        let mut groups = Vec::new();
        root.visit(Mat4::IDENTITY, &mut |node, _| {
            if matches!(node.kind, NodeKind::Group) {
                groups.push((node.name.clone(), node.transform, node.children.is_empty()));
            }
        });
        groups
    }

    fn color_of(root: &Node, name: &str) -> Option<[f32; 4]> {
        let mut found = None;
        root.visit(Mat4::IDENTITY, &mut |node, _| {
            if node.name == name {
                if let NodeKind::Mesh(mesh) = &node.kind {
                    found = Some(mesh.material.base_color);
                }
            }
        });
        found
    }

    #[test]
    fn colors_follow_depth_first_order_by_name() {
        // root
        // ├── body (group)
        // │   ├── door
        // │   └── trim (group)
        // │       └── handle
        // ├── roof
        // └── wheel (mesh with its own mesh child "hub")
        let mut resources = ResourceRegistry::new();
        let mut wheel = unit_mesh(&mut resources, "wheel", Vec3::ZERO);
        wheel = wheel.with_child(unit_mesh(&mut resources, "hub", Vec3::ZERO));
        let body = Node::group("body", Mat4::IDENTITY)
            .with_child(unit_mesh(&mut resources, "door", Vec3::ZERO))
            .with_child(
                Node::group("trim", Mat4::IDENTITY)
                    .with_child(unit_mesh(&mut resources, "handle", Vec3::ZERO)),
            );
        let mut root = Node::group("root", Mat4::IDENTITY)
            .with_child(body)
            .with_child(unit_mesh(&mut resources, "roof", Vec3::ZERO))
            .with_child(wheel);

        let palette = Palette::new(vec![
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
        ])
        .unwrap();
        assert_eq!(apply_palette(&mut root, &palette), 5);

        let red = with_alpha(Rgb::new(255, 0, 0), 0.5);
        let green = with_alpha(Rgb::new(0, 255, 0), 0.5);
        let blue = with_alpha(Rgb::new(0, 0, 255), 0.5);
        assert_eq!(color_of(&root, "door"), Some(red));
        assert_eq!(color_of(&root, "handle"), Some(green));
        assert_eq!(color_of(&root, "roof"), Some(blue));
        assert_eq!(color_of(&root, "wheel"), Some(red));
        assert_eq!(color_of(&root, "hub"), Some(green));
    }

    #[test]
    fn model_without_meshes_colors_nothing() {
        let mut root = Node::group("empty", Mat4::IDENTITY)
            .with_child(Node::group("inner", Mat4::IDENTITY));
        assert_eq!(apply_palette(&mut root, PaletteSet::default().get(0).unwrap()), 0);
    }
}
