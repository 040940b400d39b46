//! Regions: static administrative partition of the tile map.
//!
//! # Invariants
//! - Every tile belongs to exactly one region; all regions have equal area.
//! - Ids are dense, row-major, starting at 1.
//! - The partition never changes after construction.

mod error;
mod partition;

pub use error::RegionError;
pub use partition::{Region, RegionId, RegionPartition};

pub fn crate_info() -> &'static str {
    "tileworld-regions v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("regions"));
    }
}
