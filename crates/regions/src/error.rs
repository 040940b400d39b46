use crate::RegionId;

/// Errors from building or querying a region partition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("invalid region configuration: {0}")]
    InvalidConfiguration(String),
    #[error("coordinates ({x}, {y}) are outside the map")]
    OutOfRange { x: i32, y: i32 },
    #[error("region {0} not found")]
    NotFound(RegionId),
}
