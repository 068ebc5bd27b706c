use crate::assets::ModelCatalog;
use crate::palette::SwatchPanel;
use crate::render::gpu::OverlayFrame;
use crate::render::preview::box_edges;
use crate::render::FrameDesc;
use glam::Vec2;
use image::RgbaImage;
use winit::event::WindowEvent;
use winit::window::Window;

const PREVIEW_STROKE: f32 = 1.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayAction {
    SelectModel(String),
}

/// What the overlay shows for one frame.
pub struct OverlayView<'a> {
    pub frame: Option<&'a FrameDesc>,
    pub panel: &'a SwatchPanel,
    pub catalog: &'a ModelCatalog,
    pub current: Option<&'a str>,
    pub mesh_count: usize,
    pub loading: bool,
}

/// egui host: the model dropdown, the swatch surfaces at their click regions, and
/// a wireframe preview of every drawn mesh.
pub struct Overlay {
    context: egui::Context,
    winit_state: egui_winit::State,
    swatches: Vec<egui::TextureHandle>,
}

impl Overlay {
    pub fn new(window: &Window, swatch_surfaces: &[RgbaImage]) -> Self {
        let context = egui::Context::default();
        let winit_state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let swatches = load_swatch_textures(&context, swatch_surfaces);
        Self {
            context,
            winit_state,
            swatches,
        }
    }

    /// Returns `true` when egui used the event and the viewer should not see it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    pub fn run(
        &mut self,
        window: &Window,
        view: &OverlayView<'_>,
    ) -> (OverlayFrame, Vec<OverlayAction>) {
        let raw_input = self.winit_state.take_egui_input(window);
        let mut actions = Vec::new();
        let full_output = self.context.run(raw_input, |ctx| {
            actions = draw_overlay(ctx, view, &self.swatches);
        });
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        let primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        (
            OverlayFrame {
                primitives,
                textures_delta: full_output.textures_delta,
                pixels_per_point: full_output.pixels_per_point,
            },
            actions,
        )
    }
}

fn load_swatch_textures(
    ctx: &egui::Context,
    surfaces: &[RgbaImage],
) -> Vec<egui::TextureHandle> {
    surfaces
        .iter()
        .enumerate()
        .map(|(index, surface)| {
            let size = [surface.width() as usize, surface.height() as usize];
            let image = egui::ColorImage::from_rgba_unmultiplied(size, surface.as_raw());
            ctx.load_texture(
                format!("palette_{index}"),
                image,
                egui::TextureOptions::NEAREST,
            )
        })
        .collect()
}

/// Build one overlay frame. Swatch regions are window pixels, like the clicks the
/// viewer hit-tests, so they are scaled into egui points here.
fn draw_overlay(
    ctx: &egui::Context,
    view: &OverlayView<'_>,
    swatches: &[egui::TextureHandle],
) -> Vec<OverlayAction> {
    let mut actions = Vec::new();
    let ppp = ctx.pixels_per_point();
    let painter = ctx.layer_painter(egui::LayerId::background());

    if let Some(frame) = view.frame {
        let screen = ctx.screen_rect();
        let viewport = Vec2::new(screen.width(), screen.height());
        let view_proj = frame.projection * frame.view;
        for draw in &frame.draws {
            let [r, g, b, _] = draw.base_color;
            let color = egui::Color32::from(egui::Rgba::from_rgb(r, g, b));
            for [start, end] in box_edges(draw, view_proj, viewport) {
                painter.line_segment(
                    [egui::pos2(start.x, start.y), egui::pos2(end.x, end.y)],
                    egui::Stroke::new(PREVIEW_STROKE, color),
                );
            }
        }
    }

    let full_uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    for (index, texture) in swatches.iter().enumerate() {
        let Some([x, y, w, h]) = view.panel.region(index) else {
            continue;
        };
        let rect = egui::Rect::from_min_size(
            egui::pos2(x / ppp, y / ppp),
            egui::vec2(w / ppp, h / ppp),
        );
        painter.image(texture.id(), rect, full_uv, egui::Color32::WHITE);
    }

    egui::Window::new("Model")
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            let selected = view
                .current
                .and_then(|id| view.catalog.label_of(id))
                .unwrap_or("-");
            egui::ComboBox::from_id_salt("model_select")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for entry in &view.catalog.entries {
                        let is_current = view.current == Some(entry.file.as_str());
                        if ui.selectable_label(is_current, entry.label.as_str()).clicked()
                            && !is_current
                        {
                            actions.push(OverlayAction::SelectModel(entry.file.clone()));
                        }
                    }
                });
            let status = match (view.current, view.loading) {
                (_, true) => "Loading...".to_string(),
                (Some(id), false) => format!("{id}: {} meshes", view.mesh_count),
                (None, false) => "No model".to_string(),
            };
            ui.label(status);
            ui.label("Click a swatch to recolor");
        });

    actions
}

#[cfg(test)]
mod tests {
    use super::{draw_overlay, load_swatch_textures, OverlayView};
    use crate::assets::ModelCatalog;
    use crate::palette::swatch::{render_surfaces, SwatchLayout};
    use crate::palette::{PaletteSet, SwatchPanel};
    use crate::render::camera::{CameraConfig, OrbitCamera};
    use crate::render::resources::ResourceRegistry;
    use crate::render::{prepare_frame, RenderSettings};
    use crate::scene::tests::unit_mesh;
    use crate::scene::SceneGraph;
    use glam::Vec3;

    fn run_once(
        view: &OverlayView<'_>,
    ) -> (egui::Context, egui::FullOutput, Vec<egui::TextureId>) {
        let ctx = egui::Context::default();
        let surfaces = render_surfaces(PaletteSet::default().iter(), &SwatchLayout::default());
        let textures = load_swatch_textures(&ctx, &surfaces);
        let ids = textures.iter().map(|texture| texture.id()).collect();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(1280.0, 720.0),
            )),
            ..Default::default()
        };
        let mut actions = Vec::new();
        let output = ctx.run(input, |ctx| {
            actions = draw_overlay(ctx, view, &textures);
        });
        assert!(actions.is_empty());
        (ctx, output, ids)
    }

    #[test]
    fn swatches_are_painted_over_their_click_regions() {
        let panel = SwatchPanel::new(SwatchLayout::default(), 3);
        let catalog = ModelCatalog::default();
        let view = OverlayView {
            frame: None,
            panel: &panel,
            catalog: &catalog,
            current: None,
            mesh_count: 0,
            loading: false,
        };
        let (ctx, output, ids) = run_once(&view);
        let primitives = ctx.tessellate(output.shapes, output.pixels_per_point);

        for (index, id) in ids.iter().enumerate() {
            let [x, y, w, h] = panel.region(index).unwrap();
            let painted = primitives.iter().find_map(|clipped| match &clipped.primitive {
                egui::epaint::Primitive::Mesh(mesh) if mesh.texture_id == *id => {
                    Some(mesh.calc_bounds())
                }
                _ => None,
            });
            let rect = painted.expect("swatch texture painted");
            assert!((rect.min.x - x).abs() <= 1.0 && (rect.min.y - y).abs() <= 1.0);
            assert!((rect.width() - w).abs() <= 2.0 && (rect.height() - h).abs() <= 2.0);
            assert_eq!(panel.hit_test(rect.center().x, rect.center().y), Some(index));
        }
    }

    #[test]
    fn drawn_meshes_get_wireframe_preview() {
        let mut resources = ResourceRegistry::new();
        let mut scene = SceneGraph::new();
        scene.add(unit_mesh(&mut resources, "box", Vec3::ZERO));
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1280.0 / 720.0);
        let frame = prepare_frame(&scene, &camera, &RenderSettings::default());
        let panel = SwatchPanel::new(SwatchLayout::default(), 3);
        let catalog = ModelCatalog::default();
        let view = OverlayView {
            frame: Some(&frame),
            panel: &panel,
            catalog: &catalog,
            current: Some("6.glb"),
            mesh_count: 1,
            loading: false,
        };
        let (_, output, _) = run_once(&view);

        let segments = output
            .shapes
            .iter()
            .filter(|clipped| matches!(clipped.shape, egui::Shape::LineSegment { .. }))
            .count();
        assert!(segments >= 12, "{segments} line segments");
    }
}
