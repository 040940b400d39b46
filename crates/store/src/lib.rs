//! Approximate spatial storage: the backend contract, coordinate conversion
//! between tile space and store space, and the concrete backends.
//!
//! # Invariants
//! - A radius query returns every member within the radius; it may return
//!   more. Callers re-check geometry exactly.
//! - Spatial sets and records are separate namespaces.
//! - Converters are invertible on integer tile coordinates.

mod converter;
mod error;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;
mod store;

#[cfg(test)]
mod compliance;

pub use converter::{CoordinateConverter, LinearCoordinateConverter};
pub use error::StoreError;
pub use memory::InMemorySpatialStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisSpatialStore;
pub use store::{GeoPoint, KM_PER_DEGREE, SpatialStore};

pub fn crate_info() -> &'static str {
    "tileworld-store v0.1.0"
}
