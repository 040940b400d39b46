use std::sync::Mutex;

use tracing::debug;

use crate::error::StoreError;
use crate::store::{GeoPoint, SpatialStore};

/// [`SpatialStore`] backed by a Redis server's GEO commands.
///
/// A single synchronous connection is shared behind a mutex; every call is
/// one round trip.
pub struct RedisSpatialStore {
    conn: Mutex<redis::Connection>,
}

impl RedisSpatialStore {
    /// Connect to `url`, e.g. `redis://127.0.0.1:6379`.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        debug!(url, "connected to redis");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl std::fmt::Debug for RedisSpatialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSpatialStore").finish_non_exhaustive()
    }
}

impl SpatialStore for RedisSpatialStore {
    fn put(&self, key: &str, position: GeoPoint, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.lock()?;
        redis::cmd("GEOADD")
            .arg(key)
            .arg(position.lon)
            .arg(position.lat)
            .arg(member)
            .query::<()>(&mut *conn)?;
        Ok(())
    }

    fn radius(
        &self,
        key: &str,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.lock()?;
        let members = redis::cmd("GEORADIUS")
            .arg(key)
            .arg(center.lon)
            .arg(center.lat)
            .arg(radius_km)
            .arg("km")
            .query::<Vec<String>>(&mut *conn)?;
        Ok(members)
    }

    fn member_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.lock()?;
        redis::cmd("ZREM").arg(key).arg(member).query::<()>(&mut *conn)?;
        Ok(())
    }

    fn record_set(&self, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock()?;
        redis::cmd("SET").arg(key).arg(blob).query::<()>(&mut *conn)?;
        Ok(())
    }

    fn record_get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.lock()?;
        let value = redis::cmd("GET")
            .arg(key)
            .query::<Option<Vec<u8>>>(&mut *conn)?;
        Ok(value)
    }

    fn record_delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.lock()?;
        redis::cmd("DEL").arg(key).query::<()>(&mut *conn)?;
        Ok(())
    }
}
