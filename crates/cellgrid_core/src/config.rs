use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cell::{Color, TILEMAP_COUNT};
use crate::coords::ScaleMode;
use crate::geometry::Dimension;

/// One tile atlas image to load at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasConfig {
    pub id: u32,
    pub path: PathBuf,
    #[serde(default = "default_atlas_tile")]
    pub tile_width: u32,
    #[serde(default = "default_atlas_tile")]
    pub tile_height: u32,
}

fn default_atlas_tile() -> u32 {
    16
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub title: String,
    /// Pixel size of one cell before scaling.
    pub tile_size: Dimension,
    /// Logical grid the window shows.
    pub tile_count: Dimension,
    pub window_size: Dimension,
    pub scale_mode: ScaleMode,
    pub clear_color: Color,
    pub updates_per_second: f64,
    pub atlases: Vec<AtlasConfig>,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "cellgrid".to_string(),
            tile_size: Dimension::new(16, 16),
            tile_count: Dimension::new(40, 25),
            window_size: Dimension::new(1280, 800),
            scale_mode: ScaleMode::Fractional,
            clear_color: Color::BLACK,
            updates_per_second: 60.0,
            atlases: Vec::new(),
            log_level: "debug".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text).context("invalid engine config JSON")?;
        Ok(config.validated())
    }

    /// Floor sizes and rate to usable minimums and drop atlases with ids
    /// outside the bindable range.
    pub fn validated(mut self) -> Self {
        self.tile_size = self.tile_size.at_least_one();
        self.tile_count = self.tile_count.at_least_one();
        self.window_size = self.window_size.at_least_one();
        if !self.updates_per_second.is_finite() || self.updates_per_second < 1.0 {
            tracing::debug!("config: updates_per_second {} floored to 1", self.updates_per_second);
            self.updates_per_second = 1.0;
        }
        self.atlases.retain(|a| {
            let ok = a.id < TILEMAP_COUNT;
            if !ok {
                tracing::warn!("config: atlas id {} out of range (max {}), ignored", a.id, TILEMAP_COUNT - 1);
            }
            ok
        });
        for atlas in &mut self.atlases {
            atlas.tile_width = atlas.tile_width.max(1);
            atlas.tile_height = atlas.tile_height.max(1);
        }
        self
    }

    /// `tracing` level from `log_level`, defaulting to DEBUG for unknown names.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::DEBUG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_config_is_validated() {
        let cfg = EngineConfig::from_json_str(
            r#"{
                "tile_count": {"width": 0, "height": 30},
                "scale_mode": "Integer",
                "updates_per_second": 0.0,
                "atlases": [
                    {"id": 0, "path": "font.png"},
                    {"id": 9, "path": "bad.png", "tile_width": 8, "tile_height": 8}
                ],
                "log_level": "info"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.tile_count, Dimension::new(1, 30));
        assert_eq!(cfg.scale_mode, ScaleMode::Integer);
        assert_eq!(cfg.updates_per_second, 1.0);
        assert_eq!(cfg.atlases.len(), 1);
        assert_eq!(cfg.atlases[0].tile_width, 16);
        assert_eq!(cfg.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn bad_json_and_missing_file_are_errors() {
        assert!(EngineConfig::from_json_str("{ nope").is_err());
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }

    #[test]
    fn unknown_log_level_falls_back() {
        let cfg = EngineConfig { log_level: "loud".into(), ..Default::default() };
        assert_eq!(cfg.tracing_level(), tracing::Level::DEBUG);
    }
}
