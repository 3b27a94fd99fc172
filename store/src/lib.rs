//! Key-value store layer for the longtable workspace.
//!
//! The store offers only flat primitives (strings, hashes and sorted sets). Everything the
//! application knows about how entities are laid out on top of those primitives lives in
//! [`schema`], the same way the SQL schema lives in an entity crate for an ORM-backed app.
//!
//! # Backends
//!
//! - [`RedisStore`] - production backend over a redis `ConnectionManager`
//! - [`MemoryStore`] - in-process backend with the same ordering and lease semantics, used by
//!   tests and local tooling
//!
//! Both implement [`KvStore`]. Multi-key writes are expressed as a [`WriteBatch`] of
//! [`Mutation`]s and applied as one transaction by [`KvStore::apply`], whose docs describe
//! how the backends differ when a mutation fails mid-batch.

pub mod error;
pub mod memory;
pub mod mutation;
pub mod redis_store;
pub mod schema;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use mutation::{Mutation, WriteBatch};
pub use redis_store::RedisStore;

/// Primitive operations the persistence layer needs from a key-value store.
///
/// Implementations must be safe to share between any number of concurrent callers. The only
/// read-modify-write primitives are [`incr`](KvStore::incr), [`set_nx`](KvStore::set_nx) and
/// [`compare_and_set`](KvStore::compare_and_set); all other multi-step writes go through
/// [`apply`](KvStore::apply).
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Round-trips a no-op command to verify the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Atomically increments the integer at `key` and returns the new value.
    ///
    /// A missing key counts as 0, so the first call returns 1.
    async fn incr(&self, key: &str) -> Result<u64, StoreError>;

    /// Returns whether any value is stored at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Reads a plain string value.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Sets `key` to `value` only if the key is absent, with a lease.
    ///
    /// The key expires once `lease` has elapsed unless a later [`Mutation::Set`] overwrites it,
    /// which also clears the expiry.
    ///
    /// # Returns
    /// - `Ok(true)` - The key was claimed by this call
    /// - `Ok(false)` - The key already existed and was left untouched
    async fn set_nx(&self, key: &str, value: &str, lease: Duration) -> Result<bool, StoreError>;

    /// Returns whether `key` currently carries an expiry. Missing keys have none.
    async fn has_expiry(&self, key: &str) -> Result<bool, StoreError>;

    /// Replaces the string at `key` with `value` only while it still holds `expected`.
    ///
    /// The replacement carries a fresh `lease`, exactly as [`set_nx`](KvStore::set_nx) does.
    ///
    /// # Returns
    /// - `Ok(true)` - The value matched and was replaced
    /// - `Ok(false)` - The key was missing or held something else; nothing was written
    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        lease: Duration,
    ) -> Result<bool, StoreError>;

    /// Reads every field of the hash at `key`. A missing key yields an empty map.
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Reads a single hash field.
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    /// Reads members of the sorted set at `key` by rank.
    ///
    /// Ranks are inclusive and zero-based; a negative `stop` counts from the end (`-1` is the
    /// last member). Members are ordered by ascending score, then by member bytes.
    async fn zrange(&self, key: &str, start: isize, stop: isize)
        -> Result<Vec<String>, StoreError>;

    /// Reads the score of `member`, or `None` when it is not in the set.
    async fn zscore(&self, key: &str, member: &str) -> Result<Option<i64>, StoreError>;

    /// Applies every mutation of `batch` in order, as one transaction.
    ///
    /// Other clients never observe part of a batch. Backends differ on a mutation that fails
    /// while the batch executes, such as a [`Mutation::SortedAdd`] onto a key holding a hash:
    /// [`MemoryStore`] discards the whole batch, whereas redis runs `MULTI`/`EXEC` without
    /// rollback and keeps the mutations that succeeded. Callers should only build batches
    /// whose mutations match the types already stored.
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
