//! Shade2D - tile-grid shadow casting.
//!
//! Boundary edges are extracted from a sparse grid of wall tiles and a single
//! point light casts rays against them to produce a visibility polygon.

pub mod config;
pub mod edges;
pub mod grid;
pub mod input;
pub mod math;
pub mod scene;
pub mod segment;
pub mod visibility;

pub use crate::config::{ConfigError, VisibilityConfig};
pub use crate::edges::{Edge, EdgeId, EdgeSet};
pub use crate::grid::{Cell, GridCoord, OccupancyGrid, Side};
pub use crate::input::{PointerEvent, PointerTool};
pub use crate::math::Vec2;
pub use crate::scene::{FrameSnapshot, Scene, SceneBatch};
pub use crate::segment::intersect;
pub use crate::visibility::{compute_visibility, Ray};
