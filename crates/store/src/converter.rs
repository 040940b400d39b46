use crate::store::{GeoPoint, KM_PER_DEGREE};

/// Bidirectional mapping between tile coordinates and store coordinates.
///
/// Any invertible, monotonic mapping works. `radius_units` must agree with
/// the mapping: a distance of `t` tiles between two converted points is at
/// most `radius_units(t)` in the store's radius unit.
pub trait CoordinateConverter: Send + Sync {
    fn to_approx(&self, x: i32, y: i32) -> GeoPoint;

    fn from_approx(&self, point: GeoPoint) -> (i32, i32);

    /// Convert a distance in tiles to the store's radius unit (kilometres).
    fn radius_units(&self, tiles: f64) -> f64;
}

/// Linear mapping with origin at `(0, 0)`: longitude grows with x, latitude
/// with y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCoordinateConverter {
    degrees_per_tile: f64,
}

impl Default for LinearCoordinateConverter {
    /// One tile is one kilometre, i.e. 1/111 of a degree.
    fn default() -> Self {
        Self {
            degrees_per_tile: 1.0 / KM_PER_DEGREE,
        }
    }
}

impl LinearCoordinateConverter {
    /// Returns `None` unless `degrees_per_tile` is finite and positive.
    pub fn new(degrees_per_tile: f64) -> Option<Self> {
        (degrees_per_tile.is_finite() && degrees_per_tile > 0.0).then_some(Self { degrees_per_tile })
    }

    /// One tile per degree.
    pub fn identity() -> Self {
        Self {
            degrees_per_tile: 1.0,
        }
    }

    pub fn degrees_per_tile(&self) -> f64 {
        self.degrees_per_tile
    }
}

impl CoordinateConverter for LinearCoordinateConverter {
    fn to_approx(&self, x: i32, y: i32) -> GeoPoint {
        GeoPoint::new(
            x as f64 * self.degrees_per_tile,
            y as f64 * self.degrees_per_tile,
        )
    }

    fn from_approx(&self, point: GeoPoint) -> (i32, i32) {
        (
            (point.lon / self.degrees_per_tile).round() as i32,
            (point.lat / self.degrees_per_tile).round() as i32,
        )
    }

    fn radius_units(&self, tiles: f64) -> f64 {
        tiles * self.degrees_per_tile * KM_PER_DEGREE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_kilometre_per_tile() {
        let c = LinearCoordinateConverter::default();
        let p = c.to_approx(111, 222);
        assert!((p.lon - 1.0).abs() < 1e-12);
        assert!((p.lat - 2.0).abs() < 1e-12);
        assert!((c.radius_units(5.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_round_trips_tiles() {
        for c in [
            LinearCoordinateConverter::default(),
            LinearCoordinateConverter::identity(),
            LinearCoordinateConverter::new(0.001).unwrap(),
        ] {
            for (x, y) in [(0, 0), (1, 0), (17, 9999), (-3, 42)] {
                assert_eq!(c.from_approx(c.to_approx(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn mapping_is_monotonic() {
        let c = LinearCoordinateConverter::default();
        let a = c.to_approx(10, 10);
        let b = c.to_approx(11, 12);
        assert!(b.lon > a.lon);
        assert!(b.lat > a.lat);
    }

    #[test]
    fn identity_radius_scales_to_kilometres() {
        let c = LinearCoordinateConverter::identity();
        assert!((c.radius_units(2.0) - 2.0 * KM_PER_DEGREE).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_scales() {
        assert!(LinearCoordinateConverter::new(0.0).is_none());
        assert!(LinearCoordinateConverter::new(-1.0).is_none());
        assert!(LinearCoordinateConverter::new(f64::NAN).is_none());
    }
}
