//! Map configuration, loaded from YAML.
//!
//! Every field has a default, so an empty document is a valid config: a
//! 100x100 plain map in 100 regions with one mountain range and one house.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tileworld_common::{MapObject, TileType};
use tileworld_store::{KM_PER_DEGREE, LinearCoordinateConverter};

use crate::error::MapError;

pub const MAX_DIMENSION: i32 = 10_000;

/// Latitude limit of Redis GEO indexes, in degrees.
const REDIS_MAX_LATITUDE: f64 = 85.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    pub region_count: u32,
    pub default_tile: TileType,
    /// Print the map status after seeding.
    pub show_map_on_start: bool,
    /// Terrain fills applied in order before any object is placed.
    pub fills: Vec<TerrainFill>,
    pub objects: Vec<ObjectPlacement>,
    pub store: StoreConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            region_count: 100,
            default_tile: TileType::Plain,
            show_map_on_start: true,
            fills: vec![TerrainFill {
                x1: 1,
                y1: 1,
                x2: 10,
                y2: 10,
                tile: TileType::Mountain,
            }],
            objects: vec![ObjectPlacement {
                id: "house-1".into(),
                x: 12,
                y: 20,
                width: 3,
                height: 2,
                occupy_tile: Some(TileType::Mountain),
            }],
            store: StoreConfig::default(),
        }
    }
}

/// Inclusive rectangle of terrain to overwrite; corners in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainFill {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub tile: TileType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    #[serde(default = "generated_id")]
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Terrain written under the object once it is placed.
    #[serde(default)]
    pub occupy_tile: Option<TileType>,
}

fn generated_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl ObjectPlacement {
    pub fn to_object(&self) -> MapObject {
        MapObject::new(self.id.clone(), self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
    pub degrees_per_tile: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".into(),
            degrees_per_tile: 1.0 / KM_PER_DEGREE,
        }
    }
}

impl StoreConfig {
    pub fn converter(&self) -> Result<LinearCoordinateConverter, MapError> {
        LinearCoordinateConverter::new(self.degrees_per_tile).ok_or_else(|| {
            MapError::Config(format!(
                "store.degrees_per_tile must be positive, got {}",
                self.degrees_per_tile
            ))
        })
    }
}

impl MapConfig {
    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, MapError> {
        let config: MapConfig =
            serde_yaml::from_str(text).map_err(|e| MapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, MapError> {
        serde_yaml::to_string(self).map_err(|e| MapError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), MapError> {
        let bad = |msg: String| Err(MapError::Config(msg));

        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(1..=MAX_DIMENSION).contains(&value) {
                return bad(format!("{name} must be in 1..={MAX_DIMENSION}, got {value}"));
            }
        }
        if !(1..=u16::MAX as u32).contains(&self.region_count) {
            return bad(format!(
                "region_count must be in 1..={}, got {}",
                u16::MAX,
                self.region_count
            ));
        }

        for (i, fill) in self.fills.iter().enumerate() {
            let misses = fill.x1.max(fill.x2) < 0
                || fill.y1.max(fill.y2) < 0
                || fill.x1.min(fill.x2) >= self.width
                || fill.y1.min(fill.y2) >= self.height;
            if misses {
                return bad(format!("fills[{i}] does not touch the map"));
            }
        }

        let mut seen = HashSet::new();
        for (i, obj) in self.objects.iter().enumerate() {
            if obj.id.trim().is_empty() {
                return bad(format!("objects[{i}] has an empty id"));
            }
            if !seen.insert(obj.id.as_str()) {
                return bad(format!("objects[{i}] repeats id {:?}", obj.id));
            }
            if obj.width < 1 || obj.height < 1 {
                return bad(format!(
                    "objects[{i}] ({}) must be at least 1x1, got {}x{}",
                    obj.id, obj.width, obj.height
                ));
            }
            if obj.x < 0 || obj.y < 0 {
                return bad(format!("objects[{i}] ({}) has a negative origin", obj.id));
            }
        }

        let dpt = self.store.converter()?.degrees_per_tile();
        if self.store.backend == StoreBackend::Redis
            && (self.width as f64 * dpt > 180.0 || self.height as f64 * dpt > REDIS_MAX_LATITUDE)
        {
            return bad(format!(
                "a {}x{} map at {dpt} degrees per tile exceeds the redis coordinate range",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_stock_map() {
        let c = MapConfig::default();
        assert_eq!((c.width, c.height, c.region_count), (100, 100, 100));
        assert_eq!(c.default_tile, TileType::Plain);
        assert!(c.show_map_on_start);
        assert_eq!(c.fills.len(), 1);
        assert_eq!(c.fills[0].tile, TileType::Mountain);
        assert_eq!(c.objects[0].to_object(), MapObject::new("house-1", 12, 20, 3, 2));
        assert_eq!(c.store.backend, StoreBackend::Memory);
        c.validate().unwrap();
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(MapConfig::from_yaml_str("{}").unwrap(), MapConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_fields() {
        let yaml = r#"
width: 40
height: 20
region_count: 8
default_tile: water
fills: []
objects:
  - { x: 1, y: 2, width: 3, height: 1 }
  - { id: dock, x: 5, y: 5, width: 2, height: 2, occupy_tile: Mountain }
store:
  backend: redis
"#;
        let c = MapConfig::from_yaml_str(yaml).unwrap();
        assert_eq!((c.width, c.height, c.region_count), (40, 20, 8));
        assert_eq!(c.default_tile, TileType::Water);
        assert!(c.fills.is_empty());
        assert_eq!(c.objects[0].id.len(), 32);
        assert_eq!(c.objects[1].occupy_tile, Some(TileType::Mountain));
        assert_eq!(c.store.backend, StoreBackend::Redis);
        assert_eq!(c.store.redis_url, "redis://127.0.0.1:6379");
    }

    #[test]
    fn yaml_round_trip() {
        let c = MapConfig::default();
        let back = MapConfig::from_yaml_str(&c.to_yaml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cases: Vec<Box<dyn Fn(&mut MapConfig)>> = vec![
            Box::new(|c: &mut MapConfig| c.width = 0),
            Box::new(|c: &mut MapConfig| c.height = MAX_DIMENSION + 1),
            Box::new(|c: &mut MapConfig| c.region_count = 0),
            Box::new(|c: &mut MapConfig| c.region_count = 70_000),
            Box::new(|c: &mut MapConfig| c.objects[0].width = 0),
            Box::new(|c: &mut MapConfig| c.objects[0].x = -1),
            Box::new(|c: &mut MapConfig| c.objects[0].id = " ".into()),
            Box::new(|c: &mut MapConfig| {
                let dup = c.objects[0].clone();
                c.objects.push(dup);
            }),
            Box::new(|c: &mut MapConfig| c.fills[0].x1 = 200),
            Box::new(|c: &mut MapConfig| {
                c.fills[0].x1 = -5;
                c.fills[0].x2 = -1;
            }),
            Box::new(|c: &mut MapConfig| c.store.degrees_per_tile = 0.0),
            Box::new(|c: &mut MapConfig| {
                c.store.backend = StoreBackend::Redis;
                c.height = 10_000;
            }),
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut c = MapConfig::default();
            mutate(&mut c);
            assert!(
                matches!(c.validate(), Err(MapError::Config(_))),
                "case {i} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        assert!(matches!(
            MapConfig::from_yaml_str("width: [1, 2"),
            Err(MapError::Config(_))
        ));
        assert!(matches!(
            MapConfig::from_yaml_str("default_tile: lava"),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn load_reads_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width: 30\nheight: 30\nregion_count: 9").unwrap();
        let c = MapConfig::load(file.path()).unwrap();
        assert_eq!(c.region_count, 9);

        let missing = MapConfig::load(file.path().with_extension("absent"));
        assert!(matches!(missing, Err(MapError::Io(_))));
    }
}
