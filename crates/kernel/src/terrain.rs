use std::sync::atomic::{AtomicU8, Ordering};

use tileworld_common::{Rect, TileRules, TileType};
use tracing::debug;

use crate::error::MapError;

/// Fixed-size grid of terrain tiles, one byte per tile, row-major.
///
/// The shape never changes after construction. Tiles are atomics accessed
/// with relaxed ordering: a single tile read never tears, but a read of many
/// tiles during a concurrent fill may see part of the fill. Writers are
/// expected to be serialized by the caller.
#[derive(Debug)]
pub struct TerrainGrid {
    width: i32,
    height: i32,
    tiles: Box<[AtomicU8]>,
    rules: TileRules,
}

impl TerrainGrid {
    /// Grid of `width x height` tiles, all `default_tile`, with default rules.
    pub fn new(width: i32, height: i32, default_tile: TileType) -> Result<Self, MapError> {
        let count = tile_count(width, height)?;
        let tiles = (0..count)
            .map(|_| AtomicU8::new(default_tile.as_byte()))
            .collect();
        Ok(Self {
            width,
            height,
            tiles,
            rules: TileRules::default(),
        })
    }

    /// Grid from a row-major slice of exactly `width * height` tiles.
    pub fn from_tiles(width: i32, height: i32, tiles: &[TileType]) -> Result<Self, MapError> {
        let count = tile_count(width, height)?;
        if tiles.len() != count {
            return Err(MapError::InvalidConfiguration(format!(
                "expected {count} tiles for a {width}x{height} grid, got {}",
                tiles.len()
            )));
        }
        Ok(Self {
            width,
            height,
            tiles: tiles.iter().map(|t| AtomicU8::new(t.as_byte())).collect(),
            rules: TileRules::default(),
        })
    }

    /// Replace the placement rules.
    pub fn with_rules(mut self, rules: TileRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn rules(&self) -> &TileRules {
        &self.rules
    }

    /// Bytes held by tile storage.
    pub fn estimated_memory_bytes(&self) -> usize {
        self.tiles.len() * std::mem::size_of::<AtomicU8>()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn contains_rect(&self, rect: &Rect) -> bool {
        rect.is_within(self.width, self.height)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    fn load(&self, index: usize) -> TileType {
        // Only valid bytes are ever stored.
        TileType::from_byte(self.tiles[index].load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn store(&self, index: usize, tile: TileType) {
        self.tiles[index].store(tile.as_byte(), Ordering::Relaxed);
    }

    pub fn get_tile(&self, x: i32, y: i32) -> Result<TileType, MapError> {
        self.try_get_tile(x, y).ok_or(MapError::OutOfRange { x, y })
    }

    /// Like [`get_tile`](Self::get_tile) but `None` when out of range.
    pub fn try_get_tile(&self, x: i32, y: i32) -> Option<TileType> {
        self.index(x, y).map(|i| self.load(i))
    }

    pub fn set_tile(&self, x: i32, y: i32, tile: TileType) -> Result<(), MapError> {
        let i = self.index(x, y).ok_or(MapError::OutOfRange { x, y })?;
        self.store(i, tile);
        Ok(())
    }

    /// Fill the inclusive rectangle between two corners, clipped to the grid.
    /// Corners may come in any order. Nothing happens if the rectangle misses
    /// the grid entirely.
    pub fn fill_area(&self, x1: i32, y1: i32, x2: i32, y2: i32, tile: TileType) {
        let Some(area) = Rect::from_corners(x1, y1, x2, y2).clamp_to(self.width, self.height)
        else {
            debug!(x1, y1, x2, y2, "fill outside grid, ignored");
            return;
        };
        self.fill_rect(&area, tile);
    }

    /// Fill a rectangle already inside the grid.
    pub(crate) fn fill_rect(&self, area: &Rect, tile: TileType) {
        let row_len = area.width() as usize;
        for y in area.y1()..=area.y2() {
            let start = y as usize * self.width as usize + area.x1() as usize;
            for cell in &self.tiles[start..start + row_len] {
                cell.store(tile.as_byte(), Ordering::Relaxed);
            }
        }
        debug!(%area, %tile, "filled terrain");
    }

    /// True iff the rectangle lies fully inside the grid and every covered
    /// tile accepts objects. No clipping: a rectangle sticking out is refused.
    pub fn can_place_objects_in_area(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        self.can_place_in_rect(&Rect::from_corners(x1, y1, x2, y2))
    }

    pub fn can_place_in_rect(&self, area: &Rect) -> bool {
        if !self.contains_rect(area) {
            return false;
        }
        let row_len = area.width() as usize;
        (area.y1()..=area.y2()).all(|y| {
            let start = y as usize * self.width as usize + area.x1() as usize;
            (start..start + row_len).all(|i| self.rules.can_place_object(self.load(i)))
        })
    }

    /// Number of tiles currently of type `tile`.
    pub fn count_tiles(&self, tile: TileType) -> usize {
        (0..self.tiles.len()).filter(|&i| self.load(i) == tile).count()
    }

    /// Snapshot of row `y`, or `None` if out of range.
    pub fn row(&self, y: i32) -> Option<Vec<TileType>> {
        if y < 0 || y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some((start..start + self.width as usize).map(|i| self.load(i)).collect())
    }
}

fn tile_count(width: i32, height: i32) -> Result<usize, MapError> {
    if width <= 0 || height <= 0 {
        return Err(MapError::InvalidConfiguration(format!(
            "grid dimensions must be positive, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| {
            MapError::InvalidConfiguration(format!("{width}x{height} tiles overflow the address space"))
        })
}
