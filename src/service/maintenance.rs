//! Recovery from interrupted writes.
//!
//! Entity writes are atomic batches, but listings written by older versions or by a process
//! killed between steps can still hold IDs whose record is gone. Readers skip those IDs; the
//! routines here remove them for good.

use store::{schema::EntityKind, KvStore, WriteBatch};

use crate::{
    data::index::{IndexEntry, IndexRepository},
    error::AppError,
};

pub struct MaintenanceService<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> MaintenanceService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Removes IDs from the global listing of `kind` whose record no longer exists.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of dangling IDs removed
    /// - `Err(AppError::StoreErr)` - Store error during the scan or the write
    pub async fn prune_dangling(&self, kind: EntityKind) -> Result<usize, AppError> {
        let listing = kind.listing_key();
        let ids = IndexRepository::new(self.store).all_ids(listing).await?;

        let mut batch = WriteBatch::new();
        for id in ids {
            if !self.store.exists(&kind.record_key(id)).await? {
                batch.push(IndexEntry::id(listing, id).remove());
            }
        }

        let pruned = batch.len();
        if pruned > 0 {
            self.store.apply(batch).await?;
            tracing::info!("Pruned {} dangling {} ID(s) from {}", pruned, kind, listing);
        }

        Ok(pruned)
    }

    /// Runs [`prune_dangling`](Self::prune_dangling) for every entity kind.
    pub async fn prune_all(&self) -> Result<usize, AppError> {
        let mut pruned = 0;
        for kind in [EntityKind::User, EntityKind::Resource, EntityKind::Booking] {
            pruned += self.prune_dangling(kind).await?;
        }
        Ok(pruned)
    }
}
