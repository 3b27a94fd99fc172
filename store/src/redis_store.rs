//! Production backend over a shared redis connection.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::ConnectionManager, AsyncCommands, Client, ExistenceCheck, Script, SetExpiry, SetOptions,
};

use crate::{KvStore, Mutation, StoreError, WriteBatch};

/// Rewrites KEYS[1] to ARGV[2] with a PX lease of ARGV[3] when it still holds ARGV[1].
const COMPARE_AND_SET: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
    return 1
end
return 0
"#;

fn lease_millis(lease: Duration) -> u64 {
    // PX rejects 0
    u64::try_from(lease.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Redis-backed [`KvStore`].
///
/// Wraps a `ConnectionManager`, which multiplexes a single connection and reconnects on
/// failure. Clones share the same underlying connection, so the store is cheap to hand to
/// every repository and service.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens a managed connection to the redis server at `url`.
    ///
    /// # Arguments
    /// - `url` - Connection string such as `redis://127.0.0.1:6379`
    ///
    /// # Returns
    /// - `Ok(RedisStore)` - Connected store handle
    /// - `Err(StoreError::Redis)` - Invalid URL or server unreachable
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let conn = client.get_connection_manager().await?;

        Ok(Self { conn })
    }

    /// Releases the connection handle.
    ///
    /// Pending commands issued through other clones still complete; once the last clone is
    /// dropped the connection is closed.
    pub fn close(self) {
        tracing::info!("Closing redis connection");
        drop(self.conn);
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let value: u64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_nx(&self, key: &str, value: &str, lease: Duration) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::PX(lease_millis(lease)));
        // SET .. NX replies nil when the key already exists
        let reply: Option<String> = conn.set_options(key, value, options).await?;
        Ok(reply.is_some())
    }

    async fn has_expiry(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        // -2 for a missing key, -1 for a key without expiry
        let ttl: i64 = conn.pttl(key).await?;
        Ok(ttl >= 0)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        lease: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let script = Script::new(COMPARE_AND_SET);
        let replaced: i64 = script
            .key(key)
            .arg(expected)
            .arg(value)
            .arg(lease_millis(lease))
            .invoke_async(&mut conn)
            .await?;
        Ok(replaced == 1)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    async fn zrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn.zrange(key, start, stop).await?;
        Ok(members)
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<i64>, StoreError> {
        let mut conn = self.conn.clone();
        // Scores are doubles on the wire; every score written by this workspace is integral.
        let score: Option<f64> = conn.zscore(key, member).await?;
        Ok(score.map(|s| s as i64))
    }

    /// Sends the batch as one `MULTI`/`EXEC` pipeline.
    ///
    /// Redis does not roll back a transaction when one of its commands fails at `EXEC` time
    /// (for example `WRONGTYPE`): the other commands still take effect and the error is
    /// reported afterwards.
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();

        for mutation in batch.into_mutations() {
            match mutation {
                Mutation::HashSet { key, fields } => {
                    // HSET with no field/value pairs is a syntax error in redis
                    if !fields.is_empty() {
                        pipe.hset_multiple(key, fields.as_slice()).ignore();
                    }
                }
                Mutation::Delete { key } => {
                    pipe.del(key).ignore();
                }
                Mutation::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                Mutation::SortedAdd { key, score, member } => {
                    pipe.zadd(key, member, score).ignore();
                }
                Mutation::SortedRemove { key, member } => {
                    pipe.zrem(key, member).ignore();
                }
            }
        }

        let mut conn = self.conn.clone();
        let _: () = pipe.query_async(&mut conn).await?;

        Ok(())
    }
}
