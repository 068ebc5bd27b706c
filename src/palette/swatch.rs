use super::{Palette, PaletteError};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Grid geometry for palette swatches and where the swatch surfaces sit in the window.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SwatchLayout {
    pub columns: u32,
    pub cell_size: u32,
    pub surface_width: u32,
    pub surface_height: u32,
    pub panel_origin: [f32; 2],
    pub panel_gap: f32,
}

impl Default for SwatchLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            cell_size: 75,
            surface_width: 300,
            surface_height: 150,
            panel_origin: [10.0, 10.0],
            panel_gap: 10.0,
        }
    }
}

impl SwatchLayout {
    /// Top-left pixel of swatch `index` in row-major order.
    pub fn cell_origin(&self, index: usize) -> (u64, u64) {
        let columns = self.columns.max(1) as u64;
        let index = index as u64;
        let cell = self.cell_size as u64;
        ((index % columns) * cell, (index / columns) * cell)
    }

    pub fn new_surface(&self) -> RgbaImage {
        RgbaImage::new(self.surface_width, self.surface_height)
    }
}

/// Fill one solid cell per palette color. Cells past the surface edge are clipped.
pub fn render_palette(surface: &mut RgbaImage, palette: &Palette, layout: &SwatchLayout) {
    let (width, height) = (surface.width() as u64, surface.height() as u64);
    let cell = layout.cell_size as u64;
    for (index, color) in palette.colors().iter().enumerate() {
        let (x0, y0) = layout.cell_origin(index);
        if x0 >= width || y0 >= height {
            continue;
        }
        let x1 = (x0 + cell).min(width);
        let y1 = (y0 + cell).min(height);
        let pixel = Rgba(color.to_rgba8());
        for y in y0..y1 {
            for x in x0..x1 {
                surface.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }
}

/// Rasterize every palette onto its own fresh surface.
pub fn render_surfaces<'a>(
    palettes: impl Iterator<Item = &'a Palette>,
    layout: &SwatchLayout,
) -> Vec<RgbaImage> {
    palettes
        .map(|palette| {
            let mut surface = layout.new_surface();
            render_palette(&mut surface, palette, layout);
            surface
        })
        .collect()
}

pub fn export_surfaces(dir: &Path, surfaces: &[RgbaImage]) -> Result<Vec<PathBuf>, PaletteError> {
    std::fs::create_dir_all(dir).map_err(|source| PaletteError::ExportDir {
        path: dir.display().to_string(),
        source,
    })?;
    let mut written = Vec::with_capacity(surfaces.len());
    for (index, surface) in surfaces.iter().enumerate() {
        let path = dir.join(format!("palette_{index}.png"));
        surface.save(&path).map_err(|source| PaletteError::Export {
            path: path.display().to_string(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

/// Clickable swatch surfaces stacked vertically in window space, one per palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwatchPanel {
    layout: SwatchLayout,
    count: usize,
}

impl SwatchPanel {
    pub fn new(layout: SwatchLayout, count: usize) -> Self {
        Self { layout, count }
    }

    /// `(x, y, width, height)` of the surface bound to palette `index`.
    pub fn region(&self, index: usize) -> Option<[f32; 4]> {
        if index >= self.count {
            return None;
        }
        let width = self.layout.surface_width as f32;
        let height = self.layout.surface_height as f32;
        let [x, y] = self.layout.panel_origin;
        Some([
            x,
            y + index as f32 * (height + self.layout.panel_gap),
            width,
            height,
        ])
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<usize> {
        (0..self.count).find(|index| {
            self.region(*index).is_some_and(|[rx, ry, rw, rh]| {
                x >= rx && x < rx + rw && y >= ry && y < ry + rh
            })
        })
    }
}
