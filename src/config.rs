use crate::assets::ModelCatalog;
use crate::palette::SwatchLayout;
use crate::render::{CameraConfig, RenderSettings};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "swatchview.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "swatchview".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub asset_dir: PathBuf,
    pub catalog: ModelCatalog,
    /// Uniform scale applied to every loaded model root.
    pub model_scale: f32,
    pub camera: CameraConfig,
    pub swatches: SwatchLayout,
    /// JSON palette file; built-in palettes when unset.
    pub palettes_path: Option<PathBuf>,
    /// When set, swatch surfaces are written here as PNG at startup.
    pub swatch_export_dir: Option<PathBuf>,
    pub render: RenderSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            asset_dir: PathBuf::from("assets"),
            catalog: ModelCatalog::default(),
            model_scale: 10.0,
            camera: CameraConfig::default(),
            swatches: SwatchLayout::default(),
            palettes_path: None,
            swatch_export_dir: None,
            render: RenderSettings::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Explicit path if given, else `swatchview.json` if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::info!("Loading config from {}", path.display());
            return Self::load_from_file(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            log::info!("Loading config from {}", fallback.display());
            return Self::load_from_file(fallback);
        }
        log::info!("No config file, using defaults");
        Ok(Self::default())
    }
}
