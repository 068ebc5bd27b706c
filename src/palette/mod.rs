pub mod apply;
pub mod swatch;

pub use apply::apply_palette;
pub use swatch::{render_palette, SwatchLayout, SwatchPanel};

use std::path::{Path, PathBuf};

/// 8-bit sRGB color as authored in palette files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Linear-light channels, which is what material base colors store.
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(value: Rgb) -> Self {
        [value.r, value.g, value.b]
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("palette {index} has no colors")]
    EmptyPalette { index: usize },
    #[error("palette set is empty")]
    EmptySet,
    #[error("failed to read palettes at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse palettes at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to create swatch export folder {path}: {source}")]
    ExportDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write swatch image {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Ordered, non-empty list of colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self { colors })
        }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Color for the `index`-th mesh, cycling when there are more meshes than colors.
    pub fn color_wrapping(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }
}

/// Fixed collection of palettes, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSet {
    palettes: Vec<Palette>,
}

impl PaletteSet {
    pub fn from_colors(sets: Vec<Vec<Rgb>>) -> Result<Self, PaletteError> {
        if sets.is_empty() {
            return Err(PaletteError::EmptySet);
        }
        let palettes = sets
            .into_iter()
            .enumerate()
            .map(|(index, colors)| Palette::new(colors).ok_or(PaletteError::EmptyPalette { index }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { palettes })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, PaletteError> {
        let json = std::fs::read_to_string(path).map_err(|source| PaletteError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let sets: Vec<Vec<Rgb>> =
            serde_json::from_str(&json).map_err(|source| PaletteError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_colors(sets)
    }

    /// Palettes from `path` when given, otherwise the built-in set.
    pub fn load_or_default(path: Option<&PathBuf>) -> Result<Self, PaletteError> {
        match path {
            Some(path) => {
                let set = Self::load_from_file(path)?;
                log::info!("Loaded {} palettes from {}", set.len(), path.display());
                Ok(set)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Palette> {
        self.palettes.get(index)
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.iter()
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        let palettes = DEFAULT_PALETTES
            .iter()
            .map(|hexes| Palette {
                colors: hexes.iter().map(|hex| Rgb::from_hex(*hex)).collect(),
            })
            .collect();
        Self { palettes }
    }
}

const DEFAULT_PALETTES: [[u32; 8]; 3] = [
    [
        0x264653, 0x2a9d8f, 0xe9c46a, 0xf4a261, 0xe76f51, 0x8ab17d, 0xbabb74, 0xefb366,
    ],
    [
        0x001219, 0x005f73, 0x0a9396, 0x94d2bd, 0xe9d8a6, 0xee9b00, 0xca6702, 0xae2012,
    ],
    [
        0xcdb4db, 0xffc8dd, 0xffafcc, 0xbde0fe, 0xa2d2ff, 0x8d99ae, 0x6d6875, 0xb5838d,
    ],
];
