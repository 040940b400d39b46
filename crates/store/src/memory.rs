use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::trace;

use crate::error::StoreError;
use crate::store::{GeoPoint, KM_PER_DEGREE, SpatialStore};

/// In-memory reference backend for development and tests.
///
/// Distances are planar: degrees are scaled by [`KM_PER_DEGREE`], the same
/// scale the default coordinate converter uses. Spatial sets are ordered
/// maps, so radius results come back sorted by member.
#[derive(Debug, Default)]
pub struct InMemorySpatialStore {
    sets: RwLock<HashMap<String, BTreeMap<String, GeoPoint>>>,
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemorySpatialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members in the spatial set `key`.
    pub fn len(&self, key: &str) -> Result<usize, StoreError> {
        Ok(self.sets.read()?.get(key).map_or(0, BTreeMap::len))
    }

    pub fn is_empty(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.len(key)? == 0)
    }

    /// Number of stored records.
    pub fn record_count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read()?.len())
    }
}

impl SpatialStore for InMemorySpatialStore {
    fn put(&self, key: &str, position: GeoPoint, member: &str) -> Result<(), StoreError> {
        self.sets
            .write()?
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), position);
        Ok(())
    }

    fn radius(
        &self,
        key: &str,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<String>, StoreError> {
        let sets = self.sets.read()?;
        let Some(set) = sets.get(key) else {
            return Ok(Vec::new());
        };
        // Small slack so members exactly on the circle survive float rounding.
        let limit = radius_km + 1e-9;
        let hits: Vec<String> = set
            .iter()
            .filter(|(_, p)| {
                let dx = (p.lon - center.lon) * KM_PER_DEGREE;
                let dy = (p.lat - center.lat) * KM_PER_DEGREE;
                dx.hypot(dy) <= limit
            })
            .map(|(member, _)| member.clone())
            .collect();
        trace!(key, radius_km, hits = hits.len(), scanned = set.len(), "radius scan");
        Ok(hits)
    }

    fn member_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        if let Some(set) = self.sets.write()?.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    fn record_set(&self, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        self.records
            .write()?
            .insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn record_get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.records.read()?.get(key).cloned())
    }

    fn record_delete(&self, key: &str) -> Result<(), StoreError> {
        self.records.write()?.remove(key);
        Ok(())
    }
}
