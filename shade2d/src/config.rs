//! Configuration for the lit surface: tile size, logical extent and the
//! corner-straddling epsilon used by the visibility engine.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tile size must be a positive finite number, got {0}")]
    TileSize(f32),
    #[error("grid extent must be at least 1x1, got {width}x{height}")]
    Extent { width: i32, height: i32 },
    #[error("corner epsilon must be a positive finite angle, got {0}")]
    CornerEpsilon(f32),
}

/// Configuration values for a [`crate::Scene`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Size of one tile in world units.
    pub tile_size: f32,
    /// Logical grid width in tiles.
    pub grid_width: i32,
    /// Logical grid height in tiles.
    pub grid_height: i32,
    /// Angular offset (radians) of the side rays cast around each corner.
    pub corner_epsilon: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            tile_size: 30.0,
            grid_width: 20,
            grid_height: 20,
            corner_epsilon: 0.0001,
        }
    }
}

impl VisibilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tile size in world units.
    #[must_use]
    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Override the logical extent in tiles.
    #[must_use]
    pub fn with_extent(mut self, width: i32, height: i32) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    /// Override the corner epsilon in radians.
    #[must_use]
    pub fn with_corner_epsilon(mut self, epsilon: f32) -> Self {
        self.corner_epsilon = epsilon;
        self
    }

    /// World-space size of the logical extent.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.grid_width as f32 * self.tile_size,
            self.grid_height as f32 * self.tile_size,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::TileSize(self.tile_size));
        }
        if self.grid_width < 1 || self.grid_height < 1 {
            return Err(ConfigError::Extent {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if !(self.corner_epsilon.is_finite() && self.corner_epsilon > 0.0) {
            return Err(ConfigError::CornerEpsilon(self.corner_epsilon));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration from a file.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
