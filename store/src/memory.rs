//! In-process backend mirroring the redis semantics the workspace relies on.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{KvStore, Mutation, StoreError, WriteBatch};

/// Sorted set ordered by `(score, member)`, matching redis' tie-break on member bytes.
#[derive(Debug, Clone, Default)]
struct SortedSet {
    scores: HashMap<String, i64>,
    order: BTreeSet<(i64, String)>,
}

impl SortedSet {
    fn insert(&mut self, member: String, score: i64) {
        if let Some(previous) = self.scores.insert(member.clone(), score) {
            self.order.remove(&(previous, member.clone()));
        }
        self.order.insert((score, member));
    }

    fn remove(&mut self, member: &str) {
        if let Some(score) = self.scores.remove(member) {
            self.order.remove(&(score, member.to_string()));
        }
    }

    fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn range(&self, start: isize, stop: isize) -> Vec<String> {
        let len = self.order.len() as isize;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

        if len == 0 || start > stop || start >= len {
            return Vec::new();
        }

        self.order
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .map(|(_, member)| member.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct Keyspace {
    strings: HashMap<String, String>,
    hashes: HashMap<String, HashMap<String, String>>,
    sorted: HashMap<String, SortedSet>,
    /// Deadlines of leased strings. Only `set_nx` and `compare_and_set` create them.
    leases: HashMap<String, Instant>,
}

impl Keyspace {
    fn expired(&self, key: &str) -> bool {
        self.leases
            .get(key)
            .is_some_and(|deadline| *deadline <= Instant::now())
    }

    fn string(&self, key: &str) -> Option<&String> {
        if self.expired(key) {
            return None;
        }
        self.strings.get(key)
    }

    fn has_string(&self, key: &str) -> bool {
        self.string(key).is_some()
    }

    fn contains(&self, key: &str) -> bool {
        self.has_string(key) || self.hashes.contains_key(key) || self.sorted.contains_key(key)
    }

    fn remove(&mut self, key: &str) {
        self.strings.remove(key);
        self.hashes.remove(key);
        self.sorted.remove(key);
        self.leases.remove(key);
    }

    /// Drops every string whose lease ran out. Called before writes so that a lapsed claim
    /// can't shadow new values.
    fn purge_expired(&mut self) {
        let now = Instant::now();
        let lapsed: Vec<String> = self
            .leases
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in lapsed {
            self.remove(&key);
        }
    }

    fn lease(&mut self, key: &str, value: &str, lease: Duration) {
        self.remove(key);
        self.strings.insert(key.to_string(), value.to_string());
        self.leases.insert(key.to_string(), Instant::now() + lease);
    }

    fn wrong_type(key: &str) -> StoreError {
        StoreError::WrongType {
            key: key.to_string(),
        }
    }

    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::HashSet { key, fields } => {
                if self.has_string(&key) || self.sorted.contains_key(&key) {
                    return Err(Self::wrong_type(&key));
                }
                if !fields.is_empty() {
                    self.hashes.entry(key).or_default().extend(fields);
                }
            }
            Mutation::Delete { key } => self.remove(&key),
            Mutation::Set { key, value } => {
                // SET overwrites whatever type was stored, and drops any lease
                self.remove(&key);
                self.strings.insert(key, value);
            }
            Mutation::SortedAdd { key, score, member } => {
                if self.has_string(&key) || self.hashes.contains_key(&key) {
                    return Err(Self::wrong_type(&key));
                }
                self.sorted.entry(key).or_default().insert(member, score);
            }
            Mutation::SortedRemove { key, member } => {
                if let Some(set) = self.sorted.get_mut(&key) {
                    set.remove(&member);
                    if set.is_empty() {
                        self.sorted.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}

/// In-memory [`KvStore`].
///
/// Clones share the same keyspace. A batch is applied to a copy of the keyspace and swapped
/// in only when every mutation succeeded, so readers never observe half of a batch.
#[derive(Clone, Default)]
pub struct MemoryStore {
    keyspace: Arc<RwLock<Keyspace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored, across all value types.
    pub async fn len(&self) -> usize {
        self.keys().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every key currently stored, sorted. Used by tests asserting that nothing leaked.
    pub async fn keys(&self) -> Vec<String> {
        let keyspace = self.keyspace.read().await;
        let mut keys: Vec<String> = keyspace
            .strings
            .keys()
            .filter(|key| !keyspace.expired(key))
            .chain(keyspace.hashes.keys())
            .chain(keyspace.sorted.keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        let mut keyspace = self.keyspace.write().await;
        keyspace.purge_expired();
        if keyspace.hashes.contains_key(key) || keyspace.sorted.contains_key(key) {
            return Err(Keyspace::wrong_type(key));
        }

        let current = match keyspace.strings.get(key) {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| Keyspace::wrong_type(key))?,
            None => 0,
        };
        let next = current + 1;
        keyspace.strings.insert(key.to_string(), next.to_string());

        Ok(next)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.keyspace.read().await.contains(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let keyspace = self.keyspace.read().await;
        if keyspace.hashes.contains_key(key) || keyspace.sorted.contains_key(key) {
            return Err(Keyspace::wrong_type(key));
        }
        Ok(keyspace.string(key).cloned())
    }

    async fn set_nx(&self, key: &str, value: &str, lease: Duration) -> Result<bool, StoreError> {
        let mut keyspace = self.keyspace.write().await;
        keyspace.purge_expired();
        if keyspace.contains(key) {
            return Ok(false);
        }
        keyspace.lease(key, value, lease);
        Ok(true)
    }

    async fn has_expiry(&self, key: &str) -> Result<bool, StoreError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace.leases.contains_key(key) && !keyspace.expired(key))
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        lease: Duration,
    ) -> Result<bool, StoreError> {
        let mut keyspace = self.keyspace.write().await;
        keyspace.purge_expired();
        if keyspace.hashes.contains_key(key) || keyspace.sorted.contains_key(key) {
            return Err(Keyspace::wrong_type(key));
        }
        if keyspace.strings.get(key).map(String::as_str) != Some(expected) {
            return Ok(false);
        }
        keyspace.lease(key, value, lease);
        Ok(true)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let keyspace = self.keyspace.read().await;
        if keyspace.has_string(key) || keyspace.sorted.contains_key(key) {
            return Err(Keyspace::wrong_type(key));
        }
        Ok(keyspace.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let keyspace = self.keyspace.read().await;
        if keyspace.has_string(key) || keyspace.sorted.contains_key(key) {
            return Err(Keyspace::wrong_type(key));
        }
        Ok(keyspace
            .hashes
            .get(key)
            .and_then(|fields| fields.get(field))
            .cloned())
    }

    async fn zrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        let keyspace = self.keyspace.read().await;
        if keyspace.has_string(key) || keyspace.hashes.contains_key(key) {
            return Err(Keyspace::wrong_type(key));
        }
        Ok(keyspace
            .sorted
            .get(key)
            .map(|set| set.range(start, stop))
            .unwrap_or_default())
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<i64>, StoreError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace
            .sorted
            .get(key)
            .and_then(|set| set.scores.get(member))
            .copied())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut keyspace = self.keyspace.write().await;

        let mut staged = keyspace.clone();
        staged.purge_expired();
        for mutation in batch.into_mutations() {
            staged.apply(mutation)?;
        }
        *keyspace = staged;

        Ok(())
    }
}
