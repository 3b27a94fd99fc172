use store::{schema::EntityKind, KvStore};

use crate::error::AppError;

/// Issues unique, strictly increasing IDs per entity kind.
///
/// Backed by the store's atomic increment, so concurrent callers never receive the same ID.
/// IDs are never handed back: if the write that follows an allocation fails, the ID is retired
/// and the sequence has a gap.
pub struct CounterRepository<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> CounterRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Allocates the next ID for `kind`.
    ///
    /// # Returns
    /// - `Ok(u64)` - The new ID, starting from 1
    /// - `Err(AppError::StoreErr)` - Store error during the increment
    pub async fn next(&self, kind: EntityKind) -> Result<u64, AppError> {
        let id = self.store.incr(&kind.counter_key()).await?;
        Ok(id)
    }
}
