//! Bounds-box wireframes for the window preview.

use super::DrawItem;
use glam::{Mat4, Vec2, Vec3};

/// Corners closer to the eye than this (clip-space `w`) drop their edges.
const MIN_CLIP_W: f32 = 1e-4;

/// Pairs of corner indices that differ in exactly one axis bit.
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Project the item's bounds through `view_proj` into a `viewport`-sized screen
/// with the origin top-left. Edges touching a corner behind the eye are skipped.
pub fn box_edges(item: &DrawItem, view_proj: Mat4, viewport: Vec2) -> Vec<[Vec2; 2]> {
    if item.bounds.is_empty() {
        return Vec::new();
    }
    let clip = view_proj * item.world;
    let (min, max) = (item.bounds.min, item.bounds.max);
    let corners: Vec<Option<Vec2>> = (0..8)
        .map(|i| {
            let local = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            let p = clip * local.extend(1.0);
            if p.w <= MIN_CLIP_W {
                return None;
            }
            let ndc = p.truncate() / p.w;
            Some(Vec2::new(
                (ndc.x + 1.0) * 0.5 * viewport.x,
                (1.0 - ndc.y) * 0.5 * viewport.y,
            ))
        })
        .collect();

    EDGES
        .iter()
        .filter_map(|&(a, b)| Some([corners[a]?, corners[b]?]))
        .collect()
}
