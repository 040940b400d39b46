use std::fmt::Write as _;

use tileworld_common::{MapObject, Rect, TileType};
use tileworld_kernel::{MapError, MapOrchestrator};

/// Glyph drawn over tiles covered by an object.
pub const OBJECT_GLYPH: char = 'O';

/// Read-only overview of a map.
#[derive(Debug, Clone)]
pub struct MapSummary {
    pub width: i32,
    pub height: i32,
    pub regions: usize,
    pub region_grid: (i32, i32),
    pub region_size: (i32, i32),
    pub terrain_bytes: usize,
    pub tile_counts: Vec<(TileType, usize)>,
}

impl MapSummary {
    pub fn of(map: &MapOrchestrator) -> Self {
        let terrain = map.terrain();
        Self {
            width: map.width(),
            height: map.height(),
            regions: map.regions().region_count(),
            region_grid: map.regions().grid_shape(),
            region_size: map.regions().region_size(),
            terrain_bytes: terrain.estimated_memory_bytes(),
            tile_counts: TileType::ALL
                .iter()
                .map(|&t| (t, terrain.count_tiles(t)))
                .collect(),
        }
    }
}

impl std::fmt::Display for MapSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Map: {}x{} tiles, terrain {} bytes",
            self.width, self.height, self.terrain_bytes
        )?;
        writeln!(
            f,
            "Regions: {} ({}x{} grid of {}x{} tiles)",
            self.regions, self.region_grid.0, self.region_grid.1, self.region_size.0, self.region_size.1
        )?;
        let counts: Vec<String> = self
            .tile_counts
            .iter()
            .map(|(t, n)| format!("{t}={n}"))
            .collect();
        write!(f, "Tiles: {}", counts.join(" "))
    }
}

/// Text rendering of the tiles inside `window`, one line per row, with
/// objects drawn as [`OBJECT_GLYPH`].
pub fn render_window(map: &MapOrchestrator, window: Rect) -> Result<String, MapError> {
    let Some(window) = window.clamp_to(map.width(), map.height()) else {
        return Ok(String::new());
    };
    let cols = window.width() as usize;
    let mut grid: Vec<Vec<char>> = (window.y1()..=window.y2())
        .map(|y| {
            (window.x1()..=window.x2())
                .map(|x| map.terrain().try_get_tile(x, y).map_or(' ', TileType::symbol))
                .collect()
        })
        .collect();

    for obj in map.objects().objects_in_rect(&window)? {
        let Some(area) = obj.footprint().and_then(|r| r.clamp_to(map.width(), map.height())) else {
            continue;
        };
        for y in area.y1().max(window.y1())..=area.y2().min(window.y2()) {
            for x in area.x1().max(window.x1())..=area.x2().min(window.x2()) {
                grid[(y - window.y1()) as usize][(x - window.x1()) as usize] = OBJECT_GLYPH;
            }
        }
    }

    let mut out = String::with_capacity(grid.len() * (cols + 1));
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    Ok(out)
}

/// One line per object, in id order.
pub fn render_objects(objects: &[MapObject]) -> String {
    let mut out = String::new();
    for obj in objects {
        let _ = writeln!(out, "  {obj}");
    }
    out
}

/// Summary, whole-map rendering and object list, as printed after seeding.
pub fn status_report(map: &MapOrchestrator) -> Result<String, MapError> {
    let whole = Rect::from_corners(0, 0, map.width() - 1, map.height() - 1);
    let objects = map.objects().objects_in_rect(&whole)?;
    let mut out = format!("{}\n", MapSummary::of(map));
    out.push_str(&render_window(map, whole)?);
    let _ = writeln!(out, "Objects ({}):", objects.len());
    out.push_str(&render_objects(&objects));
    Ok(out)
}
