//! The lit surface: occupancy grid, edge set, light and cast rays in one place.
//!
//! Mutations never recompute edges on their own. Either call
//! [`Scene::recompute_edges`] after a group of changes or make the changes
//! through a [`SceneBatch`], which recomputes once when it goes out of scope.

use std::ops::Deref;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, VisibilityConfig};
use crate::edges::{self, Edge, EdgeSet};
use crate::grid::{GridCoord, OccupancyGrid};
use crate::math::Vec2;
use crate::visibility::{self, Ray};

/// Owner of all shadow-casting state for one surface.
#[derive(Clone, Debug)]
pub struct Scene {
    config: VisibilityConfig,
    grid: OccupancyGrid,
    edges: EdgeSet,
    light: Option<Vec2>,
    rays: Vec<Ray>,
    edges_dirty: bool,
}

impl Scene {
    /// Create an empty scene. Fails if the configuration is invalid.
    pub fn new(config: VisibilityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            grid: OccupancyGrid::new(),
            edges: EdgeSet::new(),
            light: None,
            rays: Vec::new(),
            edges_dirty: false,
        })
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    /// True if the grid changed since the last edge recompute.
    pub fn edges_dirty(&self) -> bool {
        self.edges_dirty
    }

    /// Occupy or clear a tile. Edges are not recomputed.
    pub fn set_occupancy(&mut self, x: i32, y: i32, present: bool) -> bool {
        let changed = self.grid.set(x, y, present);
        self.edges_dirty |= changed;
        changed
    }

    /// Occupy the border ring of the configured extent and return how many
    /// tiles changed. Edges are not recomputed.
    pub fn outline(&mut self) -> usize {
        let changed = self.grid.outline(self.config.grid_width, self.config.grid_height);
        self.edges_dirty |= changed > 0;
        changed
    }

    /// Rebuild the edge set from the current grid.
    pub fn recompute_edges(&mut self) {
        edges::recompute(&mut self.grid, &mut self.edges);
        self.edges_dirty = false;
    }

    /// Group tile changes under a single recompute.
    pub fn batch(&mut self) -> SceneBatch<'_> {
        SceneBatch { scene: self, changes: 0 }
    }

    /// Move the light, or remove it with `None`. Rays are not recast.
    pub fn set_light(&mut self, light: Option<Vec2>) {
        self.light = light;
    }

    pub fn light(&self) -> Option<Vec2> {
        self.light
    }

    /// Cast rays from the light against the current edge set.
    pub fn compute_visibility(&mut self) -> &[Ray] {
        if self.edges_dirty {
            log::debug!(
                "Casting against edge generation {} while the grid has pending changes",
                self.edges.generation()
            );
        }
        self.rays = visibility::compute_visibility(self.light, self.edges.all(), &self.config);
        &self.rays
    }

    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    /// Occupied tiles, in grid units.
    pub fn list_cells(&self) -> Vec<GridCoord> {
        self.grid.coords().collect()
    }

    /// Edges from the last recompute, in grid units.
    pub fn list_edges(&self) -> Vec<Edge> {
        self.edges.all().to_vec()
    }

    /// Visibility polygon from the last cast, in world units.
    pub fn list_visibility_polygon(&self) -> Vec<Vec2> {
        visibility::polygon(&self.rays)
    }

    /// Everything a renderer needs for one frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tile_size: self.config.tile_size,
            cells: self.list_cells(),
            edges: self.list_edges(),
            light: self.light,
            polygon: self.list_visibility_polygon(),
        }
    }
}

/// Scope for a group of tile changes. Recomputes edges once when dropped.
///
/// Reads go through `Deref` to the scene; tile changes only through the
/// batch's own methods, so [`SceneBatch::changes`] sees every one of them.
pub struct SceneBatch<'a> {
    scene: &'a mut Scene,
    changes: usize,
}

impl SceneBatch<'_> {
    /// Occupy or clear a tile inside the batch.
    pub fn set_occupancy(&mut self, x: i32, y: i32, present: bool) -> bool {
        let changed = self.scene.set_occupancy(x, y, present);
        if changed {
            self.changes += 1;
        }
        changed
    }

    /// Occupy the border ring inside the batch.
    pub fn outline(&mut self) -> usize {
        let changed = self.scene.outline();
        self.changes += changed;
        changed
    }

    /// Number of tiles that actually changed so far.
    pub fn changes(&self) -> usize {
        self.changes
    }
}

impl Deref for SceneBatch<'_> {
    type Target = Scene;

    fn deref(&self) -> &Self::Target {
        &*self.scene
    }
}

impl Drop for SceneBatch<'_> {
    fn drop(&mut self) {
        log::trace!("Batch closed after {} tile changes", self.changes);
        self.scene.recompute_edges();
    }
}

/// Read-only per-frame output handed to the rendering side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// World units per grid unit, for scaling `cells` and `edges`.
    pub tile_size: f32,
    pub cells: Vec<GridCoord>,
    pub edges: Vec<Edge>,
    pub light: Option<Vec2>,
    pub polygon: Vec<Vec2>,
}

impl FrameSnapshot {
    /// Serialize this snapshot to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save this snapshot to a file.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
