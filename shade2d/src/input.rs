use serde::{Deserialize, Serialize};

use crate::grid::GridCoord;
use crate::math::Vec2;
use crate::scene::Scene;

/// Pointer activity over the lit surface, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Moved(Vec2),
    Pressed(Vec2),
    Released,
    Left,
}

/// Turns pointer events into scene commands.
///
/// The light follows the pointer. Pressing on an empty tile starts painting
/// walls, pressing on a wall starts erasing, and dragging keeps whichever mode
/// the press chose until release.
#[derive(Clone, Debug, Default)]
pub struct PointerTool {
    paint: Option<bool>,
    last_tile: Option<GridCoord>,
}

impl PointerTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(true)` while painting, `Some(false)` while erasing.
    pub fn paint_mode(&self) -> Option<bool> {
        self.paint
    }

    /// Apply one event. Returns true if the grid changed.
    pub fn handle(&mut self, scene: &mut Scene, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Moved(pos) => {
                scene.set_light(Some(pos));
                match self.paint {
                    Some(present) => self.stroke(scene, pos, present),
                    None => false,
                }
            }
            PointerEvent::Pressed(pos) => {
                scene.set_light(Some(pos));
                let tile = world_to_grid(scene, pos);
                let present = !scene.grid().has(tile.x, tile.y);
                self.paint = Some(present);
                self.last_tile = None;
                self.stroke(scene, pos, present)
            }
            PointerEvent::Released => {
                self.paint = None;
                self.last_tile = None;
                false
            }
            PointerEvent::Left => {
                scene.set_light(None);
                self.paint = None;
                self.last_tile = None;
                false
            }
        }
    }

    fn stroke(&mut self, scene: &mut Scene, pos: Vec2, present: bool) -> bool {
        let tile = world_to_grid(scene, pos);
        if self.last_tile == Some(tile) || !in_extent(scene, tile) {
            return false;
        }
        self.last_tile = Some(tile);
        scene.set_occupancy(tile.x, tile.y, present)
    }
}

/// Convert a world position to the tile containing it.
pub fn world_to_grid(scene: &Scene, world_pos: Vec2) -> GridCoord {
    let tile = scene.config().tile_size;
    GridCoord::new(
        (world_pos.x / tile).floor() as i32,
        (world_pos.y / tile).floor() as i32,
    )
}

fn in_extent(scene: &Scene, coord: GridCoord) -> bool {
    let config = scene.config();
    coord.x >= 0 && coord.x < config.grid_width && coord.y >= 0 && coord.y < config.grid_height
}
