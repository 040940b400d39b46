use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Kilometres per degree used by the reference coordinate convention and by
/// the in-memory backend's planar distance.
pub const KM_PER_DEGREE: f64 = 111.0;

/// A position in the store's coordinate system, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Approximate geo-indexed key/value backend.
///
/// Two kinds of data live in a store: spatial sets (members with an
/// approximate position, queried by radius) and opaque records keyed by
/// string. The spatial side is lossy; callers must never treat a radius
/// result as exact geometry.
///
/// Contract for [`SpatialStore::radius`]: every member whose stored position
/// lies within `radius_km` of `center` is returned. Extra members near the
/// boundary are allowed.
pub trait SpatialStore: Send + Sync {
    /// Insert or move `member` in the spatial set `key`.
    fn put(&self, key: &str, position: GeoPoint, member: &str) -> Result<(), StoreError>;

    /// Members of `key` within `radius_km` of `center`, in no particular order.
    fn radius(&self, key: &str, center: GeoPoint, radius_km: f64)
    -> Result<Vec<String>, StoreError>;

    /// Remove `member` from the spatial set `key`. Absent members are ignored.
    fn member_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Write a record, replacing any previous value.
    fn record_set(&self, key: &str, blob: &[u8]) -> Result<(), StoreError>;

    fn record_get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Delete a record. Deleting an absent record is not an error.
    fn record_delete(&self, key: &str) -> Result<(), StoreError>;
}
