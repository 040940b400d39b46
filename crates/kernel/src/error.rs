use std::fmt;

use serde::{Deserialize, Serialize};
use tileworld_regions::RegionError;
use tileworld_store::StoreError;

/// Errors raised by the map layers.
///
/// Placement rejections are normally returned as values (see
/// [`Placement`]); `InvalidPlacement` is only raised by write paths whose
/// precondition is a successful placement check.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("tile ({x}, {y}) is outside the map")]
    OutOfRange { x: i32, y: i32 },
    #[error("invalid map configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid placement: {0}")]
    InvalidPlacement(PlacementRejection),
    #[error("object record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The gate a placement failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PlacementRejection {
    /// Footprint leaves the map or has a non-positive size.
    OutOfBounds,
    /// At least one covered tile does not accept objects.
    BlockedTerrain,
    /// Existing objects overlap the footprint.
    Overlap { ids: Vec<String> },
}

impl fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementRejection::OutOfBounds => f.write_str("footprint is outside the map"),
            PlacementRejection::BlockedTerrain => f.write_str("terrain does not accept objects"),
            PlacementRejection::Overlap { ids } => {
                write!(f, "overlaps existing objects [{}]", ids.join(", "))
            }
        }
    }
}

/// Outcome of a placement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Placed,
    Rejected(PlacementRejection),
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed)
    }

    pub fn rejection(&self) -> Option<&PlacementRejection> {
        match self {
            Placement::Placed => None,
            Placement::Rejected(r) => Some(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_name_the_gate() {
        assert!(PlacementRejection::BlockedTerrain.to_string().contains("terrain"));
        let overlap = PlacementRejection::Overlap {
            ids: vec!["a".into(), "b".into()],
        };
        assert_eq!(overlap.to_string(), "overlaps existing objects [a, b]");
    }

    #[test]
    fn placement_views() {
        assert!(Placement::Placed.is_placed());
        let rejected = Placement::Rejected(PlacementRejection::OutOfBounds);
        assert!(!rejected.is_placed());
        assert_eq!(rejected.rejection(), Some(&PlacementRejection::OutOfBounds));
    }

    #[test]
    fn region_errors_convert() {
        let err: MapError = RegionError::OutOfRange { x: 1, y: 2 }.into();
        assert!(matches!(err, MapError::Region(_)));
    }
}
