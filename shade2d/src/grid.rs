//! Sparse occupancy grid for wall tiles.
//!
//! A tile is occupied iff a [`Cell`] exists at its coordinate. Cells also carry
//! the per-side boundary bookkeeping written by the edge extractor, so the grid
//! itself never recomputes anything: callers mutate it and then ask
//! [`crate::edges::recompute`] for a fresh edge set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::edges::EdgeId;

/// Integer tile coordinate. `(x, y)` is the tile's top-left corner in grid units.
///
/// Ordering is x-major, then y, which is also the extractor's scan order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate of the tile across the given side.
    pub fn neighbor(&self, side: Side) -> GridCoord {
        let (dx, dy) = side.offset();
        GridCoord::new(self.x + dx, self.y + dy)
    }
}

/// One of the four sides of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Index into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::North => 0,
            Side::East => 1,
            Side::South => 2,
            Side::West => 3,
        }
    }

    /// Step (dx, dy) to the tile across this side. Y grows downward.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }
}

/// An occupied tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coord: GridCoord,
    edge_ids: [Option<EdgeId>; 4],
}

impl Cell {
    fn new(coord: GridCoord) -> Self {
        Self {
            coord,
            edge_ids: [None; 4],
        }
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Whether this side was a boundary at the last recompute.
    pub fn has_edge(&self, side: Side) -> bool {
        self.edge_ids[side.index()].is_some()
    }

    /// Edge owning this side, or `None` if the side is not a boundary.
    ///
    /// Only meaningful against the edge set produced by the most recent recompute.
    pub fn edge_id(&self, side: Side) -> Option<EdgeId> {
        self.edge_ids[side.index()]
    }

    pub(crate) fn set_edge_id(&mut self, side: Side, id: Option<EdgeId>) {
        self.edge_ids[side.index()] = id;
    }
}

/// Sparse map of occupied tiles. Coordinates are unbounded.
#[derive(Clone, Debug, Default)]
pub struct OccupancyGrid {
    cells: BTreeMap<GridCoord, Cell>,
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the tile at (x, y) is occupied.
    pub fn has(&self, x: i32, y: i32) -> bool {
        self.cells.contains_key(&GridCoord::new(x, y))
    }

    /// Get the cell at (x, y), or `None` if the tile is empty.
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.get(&GridCoord::new(x, y))
    }

    pub(crate) fn get_mut(&mut self, coord: GridCoord) -> Option<&mut Cell> {
        self.cells.get_mut(&coord)
    }

    /// Occupy or clear the tile at (x, y).
    ///
    /// Returns true if occupancy actually changed. Setting an already occupied
    /// tile keeps its existing cell untouched.
    pub fn set(&mut self, x: i32, y: i32, present: bool) -> bool {
        let coord = GridCoord::new(x, y);
        if present {
            if self.cells.contains_key(&coord) {
                return false;
            }
            self.cells.insert(coord, Cell::new(coord));
            true
        } else {
            self.cells.remove(&coord).is_some()
        }
    }

    /// Iterate over all occupied cells.
    pub fn all(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Occupied coordinates in scan order (x ascending, then y ascending).
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.cells.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Occupy the one-tile border ring of a `width` x `height` extent.
    /// Returns how many tiles were newly occupied.
    pub fn outline(&mut self, width: i32, height: i32) -> usize {
        let mut changed = 0;
        for x in 0..width {
            changed += usize::from(self.set(x, 0, true));
            changed += usize::from(self.set(x, height - 1, true));
        }
        for y in 0..height {
            changed += usize::from(self.set(0, y, true));
            changed += usize::from(self.set(width - 1, y, true));
        }
        changed
    }
}
