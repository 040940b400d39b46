//! Shared value types for the tileworld engine: tile types and their
//! capability table, inclusive rectangles, and map objects.

mod tile;
mod types;

pub use tile::{ParseTileError, TileFlags, TileRules, TileType};
pub use types::{MapObject, Rect};
