//! Shared helper utilities for factory methods.
//!
//! This module provides the raw writers every factory builds on, and writers for the broken
//! states tests need to set up.

use chrono::Utc;
use store::{
    schema::{id_member, EntityKind},
    KvStore, Mutation, StoreError, WriteBatch,
};

/// Counter for generating unique values in tests.
///
/// Used for default emails and names so that factories never collide, even when a test
/// creates many entities.
static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Gets the next unique counter value for test data.
///
/// # Returns
/// - `u64` - Next unique counter value
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Current time as unix seconds, the resolution records store timestamps at.
pub fn now_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Allocates the next ID of `kind` from the application's counter.
pub async fn allocate_id<S: KvStore>(store: &S, kind: EntityKind) -> Result<u64, StoreError> {
    store.incr(&kind.counter_key()).await
}

/// Writes (or merges into) a raw record.
///
/// # Arguments
/// - `store` - Store to write to
/// - `key` - Record key, such as `booking:3`
/// - `fields` - Field names and their stored string values
pub async fn write_record<S: KvStore>(
    store: &S,
    key: &str,
    fields: &[(&str, String)],
) -> Result<(), StoreError> {
    let mut batch = WriteBatch::new();
    batch.push(Mutation::HashSet {
        key: key.to_string(),
        fields: fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    });
    store.apply(batch).await
}

/// Adds entity `id` to the listing at `key`.
pub async fn add_to_listing<S: KvStore>(
    store: &S,
    key: &str,
    score: i64,
    id: u64,
) -> Result<(), StoreError> {
    let mut batch = WriteBatch::new();
    batch.push(Mutation::SortedAdd {
        key: key.to_string(),
        score,
        member: id_member(id),
    });
    store.apply(batch).await
}

/// Deletes a raw key, leaving every listing that references it untouched.
///
/// Simulates a cleanup that was interrupted after removing the record.
pub async fn delete_key<S: KvStore>(store: &S, key: &str) -> Result<(), StoreError> {
    let mut batch = WriteBatch::new();
    batch.push(Mutation::Delete {
        key: key.to_string(),
    });
    store.apply(batch).await
}

/// Writes a confirmed unique reference claim naming `holder`, without writing the holder.
///
/// Simulates a claim left behind by a writer that stopped before cleaning up after itself.
pub async fn write_claim<S: KvStore>(store: &S, key: &str, holder: u64) -> Result<(), StoreError> {
    let mut batch = WriteBatch::new();
    batch.push(Mutation::Set {
        key: key.to_string(),
        value: holder.to_string(),
    });
    store.apply(batch).await
}
