use std::sync::Arc;

use serde::Serialize;
use tileworld_store::SpatialStore;
use tracing::{info, info_span};

use crate::config::MapConfig;
use crate::error::{MapError, Placement, PlacementRejection};
use crate::map::MapOrchestrator;

/// What [`seed_map`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub fills_applied: usize,
    pub placed: Vec<String>,
    pub rejected: Vec<(String, PlacementRejection)>,
}

/// Build an empty map with the shape and coordinate scale of `config`.
pub fn build_map(config: &MapConfig, store: Arc<dyn SpatialStore>) -> Result<MapOrchestrator, MapError> {
    config.validate()?;
    let converter = config.store.converter()?;
    MapOrchestrator::build(
        config.width,
        config.height,
        config.region_count,
        config.default_tile,
        store,
        Arc::new(converter),
    )
}

/// Apply the configured fills, then try every configured placement.
///
/// Rejected placements are reported, not raised. Only store failures abort.
pub fn seed_map(map: &MapOrchestrator, config: &MapConfig) -> Result<SeedReport, MapError> {
    let _span = info_span!("seed", width = map.width(), height = map.height()).entered();
    let mut report = SeedReport::default();

    for fill in &config.fills {
        map.terrain()
            .fill_area(fill.x1, fill.y1, fill.x2, fill.y2, fill.tile);
        info!(x1 = fill.x1, y1 = fill.y1, x2 = fill.x2, y2 = fill.y2, tile = %fill.tile, "terrain filled");
        report.fills_applied += 1;
    }

    for placement in &config.objects {
        let obj = placement.to_object();
        match map.try_place_object(&obj, placement.occupy_tile)? {
            Placement::Placed => {
                info!(%obj, "object seeded");
                report.placed.push(placement.id.clone());
            }
            Placement::Rejected(rejection) => {
                info!(%obj, %rejection, "object not seeded");
                report.rejected.push((placement.id.clone(), rejection));
            }
        }
    }

    info!(
        placed = report.placed.len(),
        rejected = report.rejected.len(),
        "seeding finished"
    );
    Ok(report)
}
