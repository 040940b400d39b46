use serde::{Deserialize, Serialize};
use tileworld_common::Rect;

use crate::error::RegionError;

/// Region identifier. Dense, assigned row-major starting at 1.
pub type RegionId = u16;

/// One cell of the region partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    id: RegionId,
    name: String,
    bounds: Rect,
}

impl Region {
    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tiles covered by this region.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Static equal-area tiling of a `width x height` map into named regions.
///
/// The map is cut into a `rows x cols` grid of identical rectangles whose
/// shape follows the map's aspect ratio as closely as the requested count
/// allows. Every tile belongs to exactly one region. Built once, never
/// changes afterwards.
#[derive(Debug, Clone)]
pub struct RegionPartition {
    width: i32,
    height: i32,
    cols: i32,
    rows: i32,
    region_width: i32,
    region_height: i32,
    /// Region id per grid cell, row-major (`rows * cols` entries).
    cells: Vec<RegionId>,
    /// Regions indexed by `id - 1`.
    regions: Vec<Region>,
}

impl RegionPartition {
    /// Partition a `width x height` map into `region_count` equal regions.
    ///
    /// Fails with [`RegionError::InvalidConfiguration`] when a dimension or the
    /// count is not positive, the count does not fit a [`RegionId`], or the
    /// best-fitting grid does not divide the map evenly.
    pub fn new(width: i32, height: i32, region_count: u32) -> Result<Self, RegionError> {
        if width <= 0 || height <= 0 {
            return Err(RegionError::InvalidConfiguration(format!(
                "map dimensions must be positive, got {width}x{height}"
            )));
        }
        if region_count == 0 {
            return Err(RegionError::InvalidConfiguration(
                "region count must be positive".into(),
            ));
        }
        if region_count > RegionId::MAX as u32 {
            return Err(RegionError::InvalidConfiguration(format!(
                "region count {region_count} exceeds the maximum of {}",
                RegionId::MAX
            )));
        }

        let (cols, rows) = choose_grid(region_count, width, height);
        // Both factors are at most region_count, which fits in u16.
        let (cols, rows) = (cols as i32, rows as i32);
        if width % cols != 0 || height % rows != 0 {
            return Err(RegionError::InvalidConfiguration(format!(
                "equal-area regions need width divisible by cols ({cols}) and height by rows ({rows}); \
                 got width={width}, height={height}"
            )));
        }

        let region_width = width / cols;
        let region_height = height / rows;

        let mut cells = Vec::with_capacity(region_count as usize);
        let mut regions = Vec::with_capacity(region_count as usize);
        let mut next: RegionId = 1;
        for ry in 0..rows {
            for rx in 0..cols {
                let x1 = rx * region_width;
                let y1 = ry * region_height;
                regions.push(Region {
                    id: next,
                    name: format!("Region_{next}"),
                    bounds: Rect::from_corners(
                        x1,
                        y1,
                        x1 + region_width - 1,
                        y1 + region_height - 1,
                    ),
                });
                cells.push(next);
                next = next.wrapping_add(1);
            }
        }

        tracing::debug!(
            width,
            height,
            cols,
            rows,
            region_width,
            region_height,
            "built region partition"
        );

        Ok(Self {
            width,
            height,
            cols,
            rows,
            region_width,
            region_height,
            cells,
            regions,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// `(cols, rows)` of the region grid.
    pub fn grid_shape(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    /// `(width, height)` in tiles of every region.
    pub fn region_size(&self) -> (i32, i32) {
        (self.region_width, self.region_height)
    }

    /// All regions in id order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Region id of the tile at `(x, y)`.
    pub fn get_region_id(&self, x: i32, y: i32) -> Result<RegionId, RegionError> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Err(RegionError::OutOfRange { x, y });
        }
        Ok(self.cell(x / self.region_width, y / self.region_height))
    }

    pub fn get_region_by_id(&self, id: RegionId) -> Result<&Region, RegionError> {
        (id as usize)
            .checked_sub(1)
            .and_then(|i| self.regions.get(i))
            .ok_or(RegionError::NotFound(id))
    }

    pub fn is_tile_in_region(&self, x: i32, y: i32, id: RegionId) -> Result<bool, RegionError> {
        Ok(self.get_region_id(x, y)? == id)
    }

    /// Regions touched by the `w x h` area whose top-left tile is `(x, y)`.
    ///
    /// The area is clipped to the map first; the result holds each touched
    /// region once, in id order. Cost is proportional to the number of
    /// touched regions, not to the area.
    pub fn get_regions_in_area(&self, x: i32, y: i32, w: i32, h: i32) -> Vec<&Region> {
        if w <= 0 || h <= 0 {
            return Vec::new();
        }
        let x2 = (x as i64 + w as i64 - 1).min(i32::MAX as i64) as i32;
        let y2 = (y as i64 + h as i64 - 1).min(i32::MAX as i64) as i32;
        let Some(area) = Rect::from_corners(x, y, x2, y2).clamp_to(self.width, self.height) else {
            return Vec::new();
        };

        let rx1 = area.x1() / self.region_width;
        let rx2 = area.x2() / self.region_width;
        let ry1 = area.y1() / self.region_height;
        let ry2 = area.y2() / self.region_height;

        let mut result = Vec::with_capacity(((rx2 - rx1 + 1) * (ry2 - ry1 + 1)) as usize);
        for ry in ry1..=ry2 {
            for rx in rx1..=rx2 {
                let id = self.cell(rx, ry);
                if let Ok(region) = self.get_region_by_id(id) {
                    result.push(region);
                }
            }
        }
        result
    }

    fn cell(&self, rx: i32, ry: i32) -> RegionId {
        self.cells[(ry * self.cols + rx) as usize]
    }
}

/// Pick `(cols, rows)` with `cols * rows == count` whose ratio is closest to
/// `width / height`. Both orientations of every divisor pair are tried; the
/// first pair reaching the smallest error wins.
pub(crate) fn choose_grid(count: u32, width: i32, height: i32) -> (u32, u32) {
    let target = width as f64 / height as f64;
    let mut best = (1, count);
    let mut best_diff = f64::MAX;

    let mut rows: u32 = 1;
    while (rows as u64) * (rows as u64) <= count as u64 {
        if count % rows == 0 {
            let cols = count / rows;

            let diff = (cols as f64 / rows as f64 - target).abs();
            if diff < best_diff {
                best_diff = diff;
                best = (cols, rows);
            }

            let swapped = (rows as f64 / cols as f64 - target).abs();
            if swapped < best_diff {
                best_diff = swapped;
                best = (rows, cols);
            }
        }
        rows += 1;
    }
    best
}
