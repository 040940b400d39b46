use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use serde::{Deserialize, Serialize};
use tileworld_common::{MapObject, Rect, TileType};
use tileworld_store::{CoordinateConverter, SpatialStore};
use tracing::{debug, warn};

use crate::error::{MapError, PlacementRejection};
use crate::terrain::TerrainGrid;

/// Spatial set holding one anchor point per object.
pub const OBJECTS_KEY: &str = "game:objects";
/// Record holding the largest footprint dimension written so far.
pub const REACH_KEY: &str = "game:objects:reach";

/// Record key for object `id`.
pub fn object_key(id: &str) -> String {
    format!("game:object:{id}")
}

/// Change notification delivered to subscribers after the write completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ObjectEvent {
    Created(MapObject),
    Updated(MapObject),
    Deleted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type ObjectEventHandler = Box<dyn Fn(&ObjectEvent) + Send + Sync>;

/// Objects on a map, stored in a [`SpatialStore`].
///
/// The store only knows an approximate anchor per object, so every query is
/// two-phase: a radius search for candidates, then an exact rectangle test on
/// each candidate's record. The radius is widened by the index's reach so
/// objects whose anchor lies far from the query still come back as
/// candidates.
pub struct ObjectIndex {
    terrain: Arc<TerrainGrid>,
    store: Arc<dyn SpatialStore>,
    converter: Arc<dyn CoordinateConverter>,
    reach: AtomicI32,
    subscribers: Vec<(SubscriptionId, ObjectEventHandler)>,
    next_subscription: u64,
}

impl std::fmt::Debug for ObjectIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectIndex")
            .field("reach", &self.reach.load(Ordering::Relaxed))
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl ObjectIndex {
    /// Index over `terrain`, picking up the reach already recorded in `store`.
    pub fn new(
        terrain: Arc<TerrainGrid>,
        store: Arc<dyn SpatialStore>,
        converter: Arc<dyn CoordinateConverter>,
    ) -> Result<Self, MapError> {
        let index = Self {
            terrain,
            store,
            converter,
            reach: AtomicI32::new(0),
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        index.refresh_reach()?;
        Ok(index)
    }

    pub fn terrain(&self) -> &Arc<TerrainGrid> {
        &self.terrain
    }

    pub fn store(&self) -> &Arc<dyn SpatialStore> {
        &self.store
    }

    /// Largest footprint dimension seen by this index or recorded in the store.
    pub fn reach(&self) -> i32 {
        self.reach.load(Ordering::Relaxed)
    }

    pub fn subscribe(&mut self, handler: impl Fn(&ObjectEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&self, event: ObjectEvent) {
        for (_, handler) in &self.subscribers {
            handler(&event);
        }
    }

    /// Which placement gate `obj` fails, if any. Does not look at other objects.
    pub fn check_placement(&self, obj: &MapObject) -> Option<PlacementRejection> {
        let Some(area) = obj.footprint() else {
            return Some(PlacementRejection::OutOfBounds);
        };
        if !self.terrain.contains_rect(&area) {
            return Some(PlacementRejection::OutOfBounds);
        }
        if !self.terrain.can_place_in_rect(&area) {
            return Some(PlacementRejection::BlockedTerrain);
        }
        None
    }

    pub fn can_place_object(&self, obj: &MapObject) -> bool {
        self.check_placement(obj).is_none()
    }

    /// Store a new object. Fails with `InvalidPlacement` and writes nothing
    /// if the footprint leaves the map or covers blocked terrain.
    pub fn add_object(&self, obj: &MapObject) -> Result<(), MapError> {
        if let Some(rejection) = self.check_placement(obj) {
            return Err(MapError::InvalidPlacement(rejection));
        }
        self.write(obj)?;
        debug!(id = obj.id(), x = obj.x(), y = obj.y(), "object added");
        self.notify(ObjectEvent::Created(obj.clone()));
        Ok(())
    }

    /// Overwrite the object stored under `obj.id()`, wherever it was.
    /// No placement checks are made.
    pub fn update_object(&self, obj: &MapObject) -> Result<(), MapError> {
        self.write(obj)?;
        debug!(id = obj.id(), x = obj.x(), y = obj.y(), "object updated");
        self.notify(ObjectEvent::Updated(obj.clone()));
        Ok(())
    }

    /// Delete an object. Unknown ids are fine; the event is sent either way.
    pub fn remove_object(&self, id: &str) -> Result<(), MapError> {
        self.store.record_delete(&object_key(id))?;
        self.store.member_remove(OBJECTS_KEY, id)?;
        debug!(id, "object removed");
        self.notify(ObjectEvent::Deleted(id.to_string()));
        Ok(())
    }

    /// Fill the object's footprint with `tile`, clipped to the map.
    pub fn place_object_on_surface(&self, obj: &MapObject, tile: TileType) -> Result<(), MapError> {
        let area = obj
            .footprint()
            .ok_or(MapError::InvalidPlacement(PlacementRejection::OutOfBounds))?;
        self.terrain
            .fill_area(area.x1(), area.y1(), area.x2(), area.y2(), tile);
        Ok(())
    }

    /// Exact lookup. A missing or unreadable record is `None`.
    pub fn get_object(&self, id: &str) -> Result<Option<MapObject>, MapError> {
        let key = object_key(id);
        let Some(blob) = self.store.record_get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_slice::<MapObject>(&blob) {
            Ok(obj) => Ok(Some(obj)),
            Err(err) => {
                warn!(%key, %err, "unreadable object record, treating as absent");
                Ok(None)
            }
        }
    }

    /// The object covering `(x, y)`; the lowest id wins if several do.
    pub fn get_object_at(&self, x: i32, y: i32) -> Result<Option<MapObject>, MapError> {
        for id in self.candidates(x, y, 1.0)? {
            if let Some(obj) = self.get_object(&id)?.filter(|o| o.covers(x, y)) {
                return Ok(Some(obj));
            }
        }
        Ok(None)
    }

    /// Objects overlapping the inclusive rectangle between two corners, in id
    /// order.
    pub fn get_objects_in_area(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<Vec<MapObject>, MapError> {
        self.objects_in_rect(&Rect::from_corners(x1, y1, x2, y2))
    }

    pub fn objects_in_rect(&self, area: &Rect) -> Result<Vec<MapObject>, MapError> {
        let cx = ((area.x1() as i64 + area.x2() as i64) / 2) as i32;
        let cy = ((area.y1() as i64 + area.y2() as i64) / 2) as i32;
        let span = (area.width() - 1).max(area.height() - 1) as f64;
        let candidates = self.candidates(cx, cy, span / 2.0 + 1.0)?;

        let mut found = Vec::new();
        for id in &candidates {
            if let Some(obj) = self.get_object(id)?.filter(|o| o.overlaps(area)) {
                found.push(obj);
            }
        }
        debug!(%area, candidates = candidates.len(), hits = found.len(), "area query");
        Ok(found)
    }

    /// Sorted, deduplicated ids whose anchor may belong to an object within
    /// `base` tiles of `(x, y)`.
    fn candidates(&self, x: i32, y: i32, base: f64) -> Result<Vec<String>, MapError> {
        let reach = self.refresh_reach()?;
        let tiles = std::f64::consts::SQRT_2 * (base + reach as f64);
        let center = self.converter.to_approx(x, y);
        let mut ids = self
            .store
            .radius(OBJECTS_KEY, center, self.converter.radius_units(tiles))?;
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn write(&self, obj: &MapObject) -> Result<(), MapError> {
        let key = object_key(obj.id());
        let blob = serde_json::to_vec(obj)?;
        // Reach before record: a failed write must not leave a record behind.
        self.raise_reach(obj.width().max(obj.height()))?;
        self.store.record_set(&key, &blob)?;

        let position = self.converter.to_approx(obj.x(), obj.y());
        if let Err(err) = self.store.put(OBJECTS_KEY, position, obj.id()) {
            if let Err(rollback) = self.store.record_delete(&key) {
                warn!(%key, %rollback, "could not roll back object record");
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Merge the stored reach into the local one and return the result.
    fn refresh_reach(&self) -> Result<i32, MapError> {
        let stored = match self.store.record_get(REACH_KEY)? {
            Some(blob) => serde_json::from_slice::<i32>(&blob).unwrap_or_else(|err| {
                warn!(key = REACH_KEY, %err, "unreadable reach record, ignoring");
                0
            }),
            None => 0,
        };
        let previous = self.reach.fetch_max(stored, Ordering::Relaxed);
        Ok(previous.max(stored))
    }

    fn raise_reach(&self, extent: i32) -> Result<(), MapError> {
        let stored = self.refresh_reach()?;
        if extent > stored {
            self.reach.fetch_max(extent, Ordering::Relaxed);
            self.store
                .record_set(REACH_KEY, &serde_json::to_vec(&extent)?)?;
            debug!(reach = extent, "object reach raised");
        }
        Ok(())
    }
}
