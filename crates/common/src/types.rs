use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive axis-aligned rectangle in tile coordinates.
///
/// Always normalized: `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Rect {
    /// Build a rectangle from two opposite corners, in any order.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Rectangle with top-left `(x, y)` and the given size.
    ///
    /// Returns `None` for a non-positive size or when the far corner
    /// overflows `i32`.
    pub fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let x2 = x.checked_add(width - 1)?;
        let y2 = y.checked_add(height - 1)?;
        Some(Self { x1: x, y1: y, x2, y2 })
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> i64 {
        self.x2 as i64 - self.x1 as i64 + 1
    }

    pub fn height(&self) -> i64 {
        self.y2 as i64 - self.y1 as i64 + 1
    }

    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Axis-aligned interval intersection on both axes.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x2 >= other.x1 && self.x1 <= other.x2 && self.y2 >= other.y1 && self.y1 <= other.y2
    }

    /// True when the whole rectangle lies inside `[0, width) x [0, height)`.
    pub fn is_within(&self, width: i32, height: i32) -> bool {
        self.x1 >= 0 && self.y1 >= 0 && self.x2 < width && self.y2 < height
    }

    /// Clip to `[0, width) x [0, height)`, or `None` if nothing is left.
    pub fn clamp_to(&self, width: i32, height: i32) -> Option<Rect> {
        if self.x2 < 0 || self.y2 < 0 || self.x1 >= width || self.y1 >= height {
            return None;
        }
        Some(Rect {
            x1: self.x1.max(0),
            y1: self.y1.max(0),
            x2: self.x2.min(width - 1),
            y2: self.y2.min(height - 1),
        })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})..({},{})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A rectangular object placed on the tile map.
///
/// `(x, y)` is the top-left tile; the object covers `width x height` tiles.
/// The id is the object's identity: writing another object under the same id
/// replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapObject {
    id: String,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl MapObject {
    pub fn new(id: impl Into<String>, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Inclusive footprint, or `None` if the size is not positive.
    pub fn footprint(&self) -> Option<Rect> {
        Rect::from_origin_size(self.x, self.y, self.width, self.height)
    }

    /// Same object (id and size) at a new top-left position.
    pub fn moved_to(&self, x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }

    /// Whether `(x, y)` lies on this object.
    pub fn covers(&self, x: i32, y: i32) -> bool {
        self.footprint().is_some_and(|r| r.contains(x, y))
    }

    /// Overlap with an inclusive query rectangle.
    pub fn overlaps(&self, area: &Rect) -> bool {
        self.footprint().is_some_and(|r| r.intersects(area))
    }
}

impl fmt::Display for MapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: pos=({},{}) size=({}x{})",
            self.id, self.x, self.y, self.width, self.height
        )
    }
}
