use std::sync::Arc;

use tileworld_common::{MapObject, Rect, TileType};
use tileworld_regions::{Region, RegionId, RegionPartition};
use tileworld_store::{CoordinateConverter, SpatialStore};
use tracing::debug;

use crate::error::{MapError, Placement, PlacementRejection};
use crate::objects::{ObjectEvent, ObjectIndex, SubscriptionId};
use crate::terrain::TerrainGrid;

/// Single entry point for placing objects on a map.
///
/// Combines the terrain gate and the overlap gate so no write path can put an
/// object on blocked terrain or on top of another object. Everything else is
/// forwarded to the owning layer.
#[derive(Debug)]
pub struct MapOrchestrator {
    terrain: Arc<TerrainGrid>,
    objects: ObjectIndex,
    regions: RegionPartition,
}

impl MapOrchestrator {
    /// Fails if the layers disagree on the map size or the object index checks
    /// placements against a different terrain grid.
    pub fn new(
        terrain: Arc<TerrainGrid>,
        objects: ObjectIndex,
        regions: RegionPartition,
    ) -> Result<Self, MapError> {
        if !Arc::ptr_eq(objects.terrain(), &terrain) {
            return Err(MapError::InvalidConfiguration(
                "object index is bound to a different terrain grid".into(),
            ));
        }
        if (regions.width(), regions.height()) != (terrain.width(), terrain.height()) {
            return Err(MapError::InvalidConfiguration(format!(
                "region partition is {}x{} but terrain is {}x{}",
                regions.width(),
                regions.height(),
                terrain.width(),
                terrain.height()
            )));
        }
        Ok(Self {
            terrain,
            objects,
            regions,
        })
    }

    /// Build every layer for a `width x height` map.
    pub fn build(
        width: i32,
        height: i32,
        region_count: u32,
        default_tile: TileType,
        store: Arc<dyn SpatialStore>,
        converter: Arc<dyn CoordinateConverter>,
    ) -> Result<Self, MapError> {
        let terrain = Arc::new(TerrainGrid::new(width, height, default_tile)?);
        let regions = RegionPartition::new(width, height, region_count)?;
        let objects = ObjectIndex::new(terrain.clone(), store, converter)?;
        debug!(width, height, region_count, "map built");
        Self::new(terrain, objects, regions)
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn objects(&self) -> &ObjectIndex {
        &self.objects
    }

    pub fn regions(&self) -> &RegionPartition {
        &self.regions
    }

    pub fn width(&self) -> i32 {
        self.terrain.width()
    }

    pub fn height(&self) -> i32 {
        self.terrain.height()
    }

    /// Place `obj` if its footprint is inside the map, on placeable terrain,
    /// and free of other objects. On success the footprint is optionally
    /// filled with `occupy`. A rejection changes nothing.
    pub fn try_place_object(
        &self,
        obj: &MapObject,
        occupy: Option<TileType>,
    ) -> Result<Placement, MapError> {
        let Some(area) = obj.footprint() else {
            return Ok(self.rejected(obj, PlacementRejection::OutOfBounds));
        };
        if let Some(rejection) = self.check_rect(&area)? {
            return Ok(self.rejected(obj, rejection));
        }

        self.objects.add_object(obj)?;
        if let Some(tile) = occupy {
            self.terrain.fill_rect(&area, tile);
        }
        debug!(id = obj.id(), %area, "object placed");
        Ok(Placement::Placed)
    }

    fn rejected(&self, obj: &MapObject, rejection: PlacementRejection) -> Placement {
        debug!(id = obj.id(), %rejection, "placement rejected");
        Placement::Rejected(rejection)
    }

    /// The gate an object covering the given corners would fail, without
    /// writing anything.
    pub fn preview_area(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<Option<PlacementRejection>, MapError> {
        self.check_rect(&Rect::from_corners(x1, y1, x2, y2))
    }

    pub fn can_place_object_in_area(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<bool, MapError> {
        Ok(self.preview_area(x1, y1, x2, y2)?.is_none())
    }

    fn check_rect(&self, area: &Rect) -> Result<Option<PlacementRejection>, MapError> {
        if !self.terrain.contains_rect(area) {
            return Ok(Some(PlacementRejection::OutOfBounds));
        }
        if !self.terrain.can_place_in_rect(area) {
            return Ok(Some(PlacementRejection::BlockedTerrain));
        }
        let blocking = self.objects.objects_in_rect(area)?;
        if blocking.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PlacementRejection::Overlap {
                ids: blocking.iter().map(|o| o.id().to_string()).collect(),
            }))
        }
    }

    pub fn get_objects_in_area(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<Vec<MapObject>, MapError> {
        self.objects.get_objects_in_area(x1, y1, x2, y2)
    }

    pub fn get_regions_in_area(&self, x: i32, y: i32, w: i32, h: i32) -> Vec<&Region> {
        self.regions.get_regions_in_area(x, y, w, h)
    }

    pub fn get_object(&self, id: &str) -> Result<Option<MapObject>, MapError> {
        self.objects.get_object(id)
    }

    pub fn get_object_at(&self, x: i32, y: i32) -> Result<Option<MapObject>, MapError> {
        self.objects.get_object_at(x, y)
    }

    /// Unchecked overwrite; see [`ObjectIndex::update_object`].
    pub fn update_object(&self, obj: &MapObject) -> Result<(), MapError> {
        self.objects.update_object(obj)
    }

    pub fn remove_object(&self, id: &str) -> Result<(), MapError> {
        self.objects.remove_object(id)
    }

    pub fn get_region_id(&self, x: i32, y: i32) -> Result<RegionId, MapError> {
        Ok(self.regions.get_region_id(x, y)?)
    }

    pub fn get_region_by_id(&self, id: RegionId) -> Result<&Region, MapError> {
        Ok(self.regions.get_region_by_id(id)?)
    }

    pub fn subscribe(
        &mut self,
        handler: impl Fn(&ObjectEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.objects.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.objects.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tileworld_regions::RegionError;
    use tileworld_store::{InMemorySpatialStore, LinearCoordinateConverter};

    fn map(w: i32, h: i32, regions: u32) -> MapOrchestrator {
        MapOrchestrator::build(
            w,
            h,
            regions,
            TileType::Plain,
            Arc::new(InMemorySpatialStore::new()),
            Arc::new(LinearCoordinateConverter::default()),
        )
        .unwrap()
    }

    #[test]
    fn places_on_free_plain_ground() {
        let m = map(5, 5, 1);
        let obj = MapObject::new("a", 0, 0, 2, 2);
        assert_eq!(m.try_place_object(&obj, None).unwrap(), Placement::Placed);
        assert_eq!(m.get_object("a").unwrap(), Some(obj));
        assert!(!m.can_place_object_in_area(0, 0, 1, 1).unwrap());
        assert!(m.can_place_object_in_area(2, 2, 4, 4).unwrap());
    }

    #[test]
    fn rejects_overlap_and_names_blockers() {
        let m = map(5, 5, 1);
        m.try_place_object(&MapObject::new("a", 0, 0, 2, 2), None).unwrap();
        let second = MapObject::new("b", 1, 1, 2, 2);
        assert_eq!(
            m.try_place_object(&second, None).unwrap(),
            Placement::Rejected(PlacementRejection::Overlap { ids: vec!["a".into()] })
        );
        assert_eq!(m.get_object("b").unwrap(), None);
    }

    #[test]
    fn rejects_blocked_terrain_and_out_of_bounds() {
        let m = map(5, 5, 1);
        m.terrain().fill_area(3, 3, 4, 4, TileType::Mountain);
        let blocked = m.try_place_object(&MapObject::new("m", 2, 2, 2, 2), None).unwrap();
        assert_eq!(blocked.rejection(), Some(&PlacementRejection::BlockedTerrain));
        let outside = m.try_place_object(&MapObject::new("o", 4, 0, 2, 1), None).unwrap();
        assert_eq!(outside.rejection(), Some(&PlacementRejection::OutOfBounds));
        let empty = m.try_place_object(&MapObject::new("e", 0, 0, 0, 1), None).unwrap();
        assert_eq!(empty.rejection(), Some(&PlacementRejection::OutOfBounds));
        assert!(m.get_objects_in_area(0, 0, 4, 4).unwrap().is_empty());
    }

    #[test]
    fn occupy_tile_fills_footprint_only_on_success() {
        let m = map(5, 5, 1);
        let house = MapObject::new("house", 1, 1, 2, 2);
        assert!(m.try_place_object(&house, Some(TileType::Mountain)).unwrap().is_placed());
        assert_eq!(m.terrain().count_tiles(TileType::Mountain), 4);
        assert_eq!(m.terrain().get_tile(2, 2).unwrap(), TileType::Mountain);

        let clash = MapObject::new("clash", 2, 2, 2, 2);
        assert!(!m.try_place_object(&clash, Some(TileType::Water)).unwrap().is_placed());
        assert_eq!(m.terrain().count_tiles(TileType::Water), 0);
    }

    #[test]
    fn fill_then_preview() {
        let m = map(20, 20, 4);
        m.terrain().fill_area(1, 1, 10, 10, TileType::Mountain);
        assert!(!m.can_place_object_in_area(2, 2, 4, 4).unwrap());
        assert_eq!(
            m.preview_area(2, 2, 4, 4).unwrap(),
            Some(PlacementRejection::BlockedTerrain)
        );
        assert!(m.can_place_object_in_area(11, 11, 12, 12).unwrap());
        // Corners are inclusive, so (1, 1) is mountain.
        assert!(!m.can_place_object_in_area(0, 0, 1, 1).unwrap());
    }

    #[test]
    fn corner_stays_free_next_to_small_fill() {
        let m = map(10, 10, 1);
        m.terrain().fill_area(2, 2, 4, 4, TileType::Mountain);
        assert!(!m.can_place_object_in_area(2, 2, 4, 4).unwrap());
        assert!(m.can_place_object_in_area(0, 0, 1, 1).unwrap());
        assert!(m.try_place_object(&MapObject::new("hut", 0, 0, 2, 2), None).unwrap().is_placed());
    }

    #[test]
    fn large_object_blocks_far_corner() {
        let m = map(20, 20, 4);
        assert!(m.try_place_object(&MapObject::new("big", 0, 0, 10, 10), None).unwrap().is_placed());
        let small = MapObject::new("small", 8, 8, 1, 1);
        assert_eq!(
            m.try_place_object(&small, None).unwrap(),
            Placement::Rejected(PlacementRejection::Overlap { ids: vec!["big".into()] })
        );
        assert!(m.try_place_object(&small.moved_to(10, 10), None).unwrap().is_placed());
    }

    #[test]
    fn forwards_region_queries() {
        let m = map(8, 6, 4);
        assert_eq!(m.get_region_id(0, 0).unwrap(), 1);
        assert_eq!(m.get_region_id(7, 5).unwrap(), 4);
        assert_eq!(m.get_regions_in_area(3, 2, 2, 2).len(), 4);
        assert_eq!(m.get_region_by_id(2).unwrap().id(), 2);
        assert!(matches!(
            m.get_region_id(8, 0),
            Err(MapError::Region(RegionError::OutOfRange { x: 8, y: 0 }))
        ));
        assert!(m.get_region_by_id(5).is_err());
    }

    #[test]
    fn subscribers_attach_through_the_map() {
        let mut m = map(5, 5, 1);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        m.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        let obj = MapObject::new("a", 0, 0, 1, 1);
        m.try_place_object(&obj, None).unwrap();
        m.try_place_object(&obj, None).unwrap();
        m.update_object(&obj.moved_to(3, 3)).unwrap();
        m.remove_object("a").unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                ObjectEvent::Created(obj.clone()),
                ObjectEvent::Updated(obj.moved_to(3, 3)),
                ObjectEvent::Deleted("a".into()),
            ]
        );
    }

    #[test]
    fn get_object_at_forwards() {
        let m = map(10, 10, 1);
        m.try_place_object(&MapObject::new("a", 2, 2, 3, 3), None).unwrap();
        assert_eq!(m.get_object_at(4, 4).unwrap().unwrap().id(), "a");
        assert_eq!(m.get_object_at(5, 5).unwrap(), None);
    }

    #[test]
    fn new_rejects_mismatched_layers() {
        let store: Arc<dyn SpatialStore> = Arc::new(InMemorySpatialStore::new());
        let converter: Arc<dyn CoordinateConverter> = Arc::new(LinearCoordinateConverter::default());
        let terrain = Arc::new(TerrainGrid::new(10, 10, TileType::Plain).unwrap());
        let other = Arc::new(TerrainGrid::new(10, 10, TileType::Plain).unwrap());

        let foreign = ObjectIndex::new(other, store.clone(), converter.clone()).unwrap();
        let regions = RegionPartition::new(10, 10, 4).unwrap();
        assert!(matches!(
            MapOrchestrator::new(terrain.clone(), foreign, regions),
            Err(MapError::InvalidConfiguration(_))
        ));

        let objects = ObjectIndex::new(terrain.clone(), store, converter).unwrap();
        let wrong_size = RegionPartition::new(20, 10, 4).unwrap();
        assert!(matches!(
            MapOrchestrator::new(terrain, objects, wrong_size),
            Err(MapError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn build_surfaces_region_errors() {
        let err = MapOrchestrator::build(
            10,
            10,
            3,
            TileType::Plain,
            Arc::new(InMemorySpatialStore::new()),
            Arc::new(LinearCoordinateConverter::default()),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::Region(RegionError::InvalidConfiguration(_))));
    }

    #[test]
    fn map_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MapOrchestrator>();
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn rects() -> impl Strategy<Value = Vec<(i32, i32, i32, i32)>> {
            prop::collection::vec((-2..14i32, -2..14i32, 1..6i32, 1..6i32), 1..25)
        }

        proptest! {
            #[test]
            fn placement_matches_terrain_and_overlap(tries in rects()) {
                let m = map(12, 12, 4);
                m.terrain().fill_area(4, 0, 5, 6, TileType::Water);
                let mut placed: Vec<Rect> = Vec::new();

                for (i, (x, y, w, h)) in tries.into_iter().enumerate() {
                    let obj = MapObject::new(format!("o{i}"), x, y, w, h);
                    let area = obj.footprint().unwrap();
                    let terrain_ok = area.is_within(12, 12)
                        && (area.y1()..=area.y2()).all(|ty| {
                            (area.x1()..=area.x2())
                                .all(|tx| m.terrain().get_tile(tx, ty).unwrap() == TileType::Plain)
                        });
                    let free = placed.iter().all(|p| !p.intersects(&area));

                    let outcome = m.try_place_object(&obj, None).unwrap();
                    prop_assert_eq!(outcome.is_placed(), terrain_ok && free);
                    if outcome.is_placed() {
                        placed.push(area);
                        prop_assert!(!m
                            .can_place_object_in_area(area.x1(), area.y1(), area.x2(), area.y2())
                            .unwrap());
                    }
                }
            }
        }
    }
}
