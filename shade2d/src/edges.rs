//! Boundary edge extraction.
//!
//! Every recompute rebuilds the [`EdgeSet`] from scratch: the arena is cleared,
//! ids restart at 1, and each occupied cell's boundary sides are either merged
//! into the edge of the neighbour that extends the same boundary line or given
//! a new unit edge.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::grid::{GridCoord, OccupancyGrid, Side};
use crate::math::Vec2;

/// Identifier of an edge within one recompute generation. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(NonZeroU32);

impl EdgeId {
    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Axis-aligned occluding segment in grid units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub sx: i32,
    pub sy: i32,
    pub ex: i32,
    pub ey: i32,
}

impl Edge {
    pub fn new(sx: i32, sy: i32, ex: i32, ey: i32) -> Self {
        Self { sx, sy, ex, ey }
    }

    /// Unit edge covering one side of the tile at `coord`.
    pub fn unit(coord: GridCoord, side: Side) -> Self {
        let GridCoord { x, y } = coord;
        match side {
            Side::North => Self::new(x, y, x + 1, y),
            Side::East => Self::new(x + 1, y, x + 1, y + 1),
            Side::South => Self::new(x, y + 1, x + 1, y + 1),
            Side::West => Self::new(x, y, x, y + 1),
        }
    }

    pub fn start(&self) -> (i32, i32) {
        (self.sx, self.sy)
    }

    pub fn end(&self) -> (i32, i32) {
        (self.ex, self.ey)
    }

    /// Start point scaled to world units.
    pub fn world_start(&self, tile_size: f32) -> Vec2 {
        Vec2::new(self.sx as f32 * tile_size, self.sy as f32 * tile_size)
    }

    /// End point scaled to world units.
    pub fn world_end(&self, tile_size: f32) -> Vec2 {
        Vec2::new(self.ex as f32 * tile_size, self.ey as f32 * tile_size)
    }

    /// Length in grid units (edges are axis-aligned).
    pub fn length(&self) -> i32 {
        (self.ex - self.sx).abs() + (self.ey - self.sy).abs()
    }
}

/// Arena of edges for a single recompute generation.
#[derive(Clone, Debug, Default)]
pub struct EdgeSet {
    edges: Vec<Edge>,
    generation: u64,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an edge by id. Returns `None` for ids not issued in this generation.
    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    fn get_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.index())
    }

    /// Append an edge and return its id. Ids are issued 1, 2, 3... after each clear.
    pub fn add(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(NonZeroU32::MIN.saturating_add(self.edges.len() as u32));
        self.edges.push(edge);
        id
    }

    /// All edges in insertion order.
    pub fn all(&self) -> &[Edge] {
        &self.edges
    }

    /// Drop every edge and start a new generation.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of times this set has been cleared.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Rebuild `edges` from the boundary sides of every occupied cell in `grid`.
///
/// Cells are visited x-major, so the west and north neighbours of a cell are
/// always processed before the cell itself and their edge ids are current.
pub fn recompute(grid: &mut OccupancyGrid, edges: &mut EdgeSet) {
    edges.clear();

    let coords: Vec<GridCoord> = grid.coords().collect();
    for &coord in &coords {
        if let Some(cell) = grid.get_mut(coord) {
            for side in Side::ALL {
                cell.set_edge_id(side, None);
            }
        }
    }

    for &coord in &coords {
        for side in Side::ALL {
            let across = coord.neighbor(side);
            let id = if grid.has(across.x, across.y) {
                None
            } else {
                Some(extend_or_add(grid, edges, coord, side))
            };
            if let Some(cell) = grid.get_mut(coord) {
                cell.set_edge_id(side, id);
            }
        }
    }

    log::debug!(
        "Recomputed {} edges from {} cells (generation {})",
        edges.len(),
        grid.len(),
        edges.generation()
    );
}

fn extend_or_add(grid: &OccupancyGrid, edges: &mut EdgeSet, coord: GridCoord, side: Side) -> EdgeId {
    // North/south boundaries run horizontally and grow from the west neighbour;
    // east/west boundaries run vertically and grow from the north neighbour.
    let extending = match side {
        Side::North | Side::South => coord.neighbor(Side::West),
        Side::East | Side::West => coord.neighbor(Side::North),
    };

    let shared = grid
        .get(extending.x, extending.y)
        .and_then(|cell| cell.edge_id(side));

    if let Some(id) = shared {
        if let Some(edge) = edges.get_mut(id) {
            match side {
                Side::North | Side::South => edge.ex = coord.x + 1,
                Side::East | Side::West => edge.ey = coord.y + 1,
            }
            return id;
        }
        log::warn!("Edge {} missing from generation {}", id.get(), edges.generation());
    }

    edges.add(Edge::unit(coord, side))
}
