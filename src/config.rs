// config.rs - 运行配置（JSON 文件，可选）
//
// 解析顺序：
// - CLI: --config <path>
// - Env: GLOBE_CONFIG
// - 否则使用默认值（250 px 半径，30°/20° 经纬网）

use crate::error::GlobeError;
use crate::graticule::Graticule;
use crate::projection::Rotation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Globe radius in pixels, before fitting to the window.
    pub radius: f64,
    /// Empty margin around the disk, same unit as `radius`.
    pub padding: f64,
    pub initial_rotation: Rotation,
    pub graticule: GraticuleConfig,
    pub outline_segments: usize,
    pub style: Style,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: 250.0,
            padding: 25.0,
            initial_rotation: Rotation::IDENTITY,
            graticule: GraticuleConfig::default(),
            outline_segments: 128,
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraticuleConfig {
    pub step: [f64; 2],
    pub extent: [[f64; 2]; 2],
    pub precision: f64,
}

impl Default for GraticuleConfig {
    fn default() -> Self {
        Self {
            step: [30.0, 20.0],
            extent: [[-180.0, -80.0001], [180.0, 80.0001]],
            precision: 2.5,
        }
    }
}

impl GraticuleConfig {
    pub fn build(&self) -> Graticule {
        Graticule::new()
            .step(self.step)
            .extent(self.extent)
            .precision(self.precision)
    }
}

/// Stroke colors (sRGB) shared by the GPU renderer and the SVG export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub outline: [u8; 3],
    pub graticule: [u8; 3],
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            outline: [255, 255, 255],
            graticule: [128, 128, 128],
            opacity: 0.5,
        }
    }
}

impl GlobeConfig {
    pub fn load(path: &Path) -> Result<Self, GlobeError> {
        if !path.exists() {
            return Err(GlobeError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: GlobeConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GlobeError> {
        if !(self.radius > 0.0) {
            return Err(GlobeError::InvalidConfig(format!("radius must be positive, got {}", self.radius)));
        }
        if !(self.padding >= 0.0) {
            return Err(GlobeError::InvalidConfig(format!("padding must not be negative, got {}", self.padding)));
        }
        let g = &self.graticule;
        if !(g.step[0] > 0.0 && g.step[1] > 0.0) {
            return Err(GlobeError::InvalidConfig(format!("graticule step must be positive, got {:?}", g.step)));
        }
        if !(g.precision > 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "graticule precision must be positive, got {}",
                g.precision
            )));
        }
        if !(0.0..=1.0).contains(&self.style.opacity) {
            return Err(GlobeError::InvalidConfig(format!(
                "opacity must be within [0, 1], got {}",
                self.style.opacity
            )));
        }
        Ok(())
    }

    /// Loads the configured file if any; falls back to defaults on any failure.
    pub fn resolve() -> Self {
        let Some(path) = resolve_config_path_from_args() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }
}

/// CLI `--config <path>`, then env `GLOBE_CONFIG`.
pub fn resolve_config_path_from_args() -> Option<PathBuf> {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--config" {
            if let Some(v) = it.next() {
                return Some(PathBuf::from(v));
            }
        }
    }

    if let Ok(v) = std::env::var("GLOBE_CONFIG") {
        if !v.trim().is_empty() {
            return Some(PathBuf::from(v));
        }
    }

    None
}
