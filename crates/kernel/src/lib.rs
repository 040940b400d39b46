//! Tile map kernel: terrain grid, object index, and the orchestrator that
//! keeps them consistent.
//!
//! # Invariants
//! - Every placement path checks terrain and overlap before writing.
//! - Object queries re-check candidates against exact footprints; the
//!   spatial store is only a coarse filter.
//! - Object events fire after the write they describe, in program order.

pub mod config;
mod error;
mod map;
mod objects;
mod seed;
mod terrain;

pub use config::{MapConfig, ObjectPlacement, StoreBackend, StoreConfig, TerrainFill};
pub use error::{MapError, Placement, PlacementRejection};
pub use map::MapOrchestrator;
pub use objects::{
    OBJECTS_KEY, ObjectEvent, ObjectEventHandler, ObjectIndex, REACH_KEY, SubscriptionId,
    object_key,
};
pub use seed::{SeedReport, build_map, seed_map};
pub use terrain::TerrainGrid;
