//! Generic entity persistence.
//!
//! One implementation of create/read/update/delete serves every entity kind. A kind plugs in
//! through the [`Entity`] trait, which declares how its record is encoded and which listings and
//! unique references the entity participates in. The repository derives every index mutation
//! from those declarations, so insert, update and delete can never disagree about which
//! listings an entity belongs to.
//!
//! Each write compiles into a single [`WriteBatch`] that the store applies atomically. Unique
//! references (a user's email, a booked seat) are claimed with a set-if-absent before the batch
//! is committed and released again if the commit fails.
//!
//! A fresh claim carries a lease of [`CLAIM_LEASE`]; the commit batch rewrites it without one.
//! A writer that dies between the two leaves a claim that lapses on its own. A claim without a
//! lease whose holder record is gone is stale and gets taken over by the next claimant.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use store::{
    schema::{field, EntityKind},
    KvStore, Mutation, WriteBatch,
};

use crate::{
    data::{
        counter::CounterRepository,
        index::{IndexEntry, IndexRepository},
    },
    error::{record::RecordError, AppError},
    util::parse::now,
};

/// How long an unconfirmed unique reference claim survives before it lapses.
pub const CLAIM_LEASE: Duration = Duration::from_secs(30);

/// A reference that at most one live entity may hold at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueRef {
    /// Key claimed in the store; its value is the holder's ID.
    pub key: String,
    /// Human readable description used when the claim fails.
    pub label: String,
}

impl UniqueRef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A persisted entity kind.
///
/// Implementors describe their record layout and their index memberships; the
/// [`EntityRepository`] does the rest.
pub trait Entity: Clone + Send + Sync + Sized {
    /// Parameters accepted when creating the entity.
    type Draft: Send;
    /// Parameters accepted when updating the entity. Absent fields are left untouched.
    type Patch: Send;

    const KIND: EntityKind;

    /// Checks draft fields the type system cannot express (non-empty names, capacity above 0).
    fn validate_draft(_draft: &Self::Draft) -> Result<(), AppError> {
        Ok(())
    }

    /// Builds the entity from a draft once its ID and creation time are known.
    fn from_draft(id: u64, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// Applies a patch in place.
    ///
    /// # Returns
    /// - `Ok(Vec<&'static str>)` - Stored names of the fields the patch supplied
    /// - `Err(AppError)` - The patch holds invalid values
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<Vec<&'static str>, AppError>;

    fn id(&self) -> u64;

    fn created_at(&self) -> DateTime<Utc>;

    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Encodes every stored field, including `id` and the timestamps.
    fn to_fields(&self) -> Vec<(String, String)>;

    /// Decodes a record read from `key`.
    fn from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Self, RecordError>;

    /// Listings the entity belongs to, besides its kind's global listing.
    fn index_entries(&self) -> Vec<IndexEntry> {
        Vec::new()
    }

    /// Unique references the entity holds.
    fn unique_refs(&self) -> Vec<UniqueRef> {
        Vec::new()
    }

    /// Key of the entity's record.
    fn record_key(&self) -> String {
        Self::KIND.record_key(self.id())
    }
}

/// Repository implementing create/read/update/delete for any [`Entity`].
pub struct EntityRepository<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> EntityRepository<'a, S> {
    /// Creates a new EntityRepository instance.
    ///
    /// # Arguments
    /// - `store` - Store handle shared by the caller
    ///
    /// # Returns
    /// - `EntityRepository` - New repository instance
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Checks whether a record exists without loading it.
    pub async fn exists<E: Entity>(&self, id: u64) -> Result<bool, AppError> {
        let exists = self.store.exists(&E::KIND.record_key(id)).await?;
        Ok(exists)
    }

    /// Loads an entity if its record exists.
    ///
    /// # Returns
    /// - `Ok(Some(E))` - The decoded entity
    /// - `Ok(None)` - No record is stored under the ID
    /// - `Err(AppError::CorruptRecord)` - The record exists but failed to decode
    /// - `Err(AppError::StoreErr)` - Store error during the read
    pub async fn find<E: Entity>(&self, id: u64) -> Result<Option<E>, AppError> {
        let key = E::KIND.record_key(id);
        let fields = self.store.hgetall(&key).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let entity = E::from_fields(&key, &fields)?;
        Ok(Some(entity))
    }

    /// Loads an entity, failing if it doesn't exist.
    ///
    /// # Returns
    /// - `Ok(E)` - The decoded entity
    /// - `Err(AppError::NotFound)` - No record is stored under the ID
    /// - `Err(AppError::CorruptRecord)` - The record exists but failed to decode
    /// - `Err(AppError::StoreErr)` - Store error during the read
    pub async fn get<E: Entity>(&self, id: u64) -> Result<E, AppError> {
        self.find::<E>(id)
            .await?
            .ok_or_else(|| not_found(E::KIND, id))
    }

    /// Inserts a new entity.
    ///
    /// Equivalent to [`insert_with`](Self::insert_with) with no related mutations.
    pub async fn insert<E: Entity>(&self, draft: E::Draft) -> Result<E, AppError> {
        self.insert_with(draft, |_| Vec::new()).await
    }

    /// Inserts a new entity, committing `related` mutations in the same batch.
    ///
    /// Allocates an ID, stamps the creation time, claims the entity's unique references, then
    /// writes the record together with every listing entry in one atomic batch.
    ///
    /// # Arguments
    /// - `draft` - Creation parameters
    /// - `related` - Builds extra mutations (relation edges) from the new entity
    ///
    /// # Returns
    /// - `Ok(E)` - The stored entity, with its ID and creation time
    /// - `Err(AppError::Conflict)` - A unique reference is already held by another entity
    /// - `Err(AppError::StoreErr)` - Store error; any claims made by this call are released
    pub async fn insert_with<E, F>(&self, draft: E::Draft, related: F) -> Result<E, AppError>
    where
        E: Entity,
        F: FnOnce(&E) -> Vec<Mutation> + Send,
    {
        E::validate_draft(&draft)?;

        let id = CounterRepository::new(self.store).next(E::KIND).await?;
        let entity = E::from_draft(id, now(), draft);

        let claimed = self.claim::<E>(id, entity.unique_refs()).await?;

        let mut batch = self.insertion_plan(&entity);
        batch.extend(confirm_claims(id, &claimed));
        batch.extend(related(&entity));

        if let Err(e) = self.store.apply(batch).await {
            self.release(&claimed).await;
            return Err(e.into());
        }

        tracing::info!("Inserted {} {}", E::KIND, id);
        Ok(entity)
    }

    /// Mutations writing a new entity: its record, its global listing entry and every index
    /// entry it declares. Unique references are claimed separately before commit, and confirmed
    /// by the caller in the same batch.
    pub fn insertion_plan<E: Entity>(&self, entity: &E) -> WriteBatch {
        let score = entity.created_at().timestamp();

        let mut batch = WriteBatch::new();
        batch.push(Mutation::HashSet {
            key: entity.record_key(),
            fields: entity.to_fields(),
        });
        batch.push(global_entry::<E>(entity.id()).add(score));
        batch.extend(entity.index_entries().iter().map(|entry| entry.add(score)));
        batch
    }

    /// Updates an existing entity with the fields supplied in `patch`.
    ///
    /// Only supplied fields and the update timestamp are written; everything else in the
    /// stored record is left as it was. Listing entries and unique references that depend on
    /// changed fields are moved in the same batch.
    ///
    /// # Arguments
    /// - `id` - ID of the entity to update
    /// - `patch` - Fields to change
    /// - `related` - Extra mutations committed in the same batch
    ///
    /// # Returns
    /// - `Ok(E)` - The entity as stored after the update
    /// - `Err(AppError::NotFound)` - No entity with the ID exists
    /// - `Err(AppError::Conflict)` - A newly required unique reference is held by another entity
    /// - `Err(AppError::StoreErr)` - Store error; any claims made by this call are released
    pub async fn update_with<E: Entity>(
        &self,
        id: u64,
        patch: E::Patch,
        related: Vec<Mutation>,
    ) -> Result<E, AppError> {
        let current = self.get::<E>(id).await?;
        self.update_loaded(current, patch, related).await
    }

    /// Same as [`update_with`](Self::update_with) for an entity the caller already loaded.
    pub async fn update_loaded<E: Entity>(
        &self,
        current: E,
        patch: E::Patch,
        related: Vec<Mutation>,
    ) -> Result<E, AppError> {
        let id = current.id();
        let mut updated = current.clone();
        let touched = updated.apply_patch(patch)?;
        updated.set_updated_at(now());

        let old_refs = current.unique_refs();
        let new_refs = updated.unique_refs();
        let added_refs: Vec<UniqueRef> = new_refs
            .iter()
            .filter(|r| !old_refs.iter().any(|old| old.key == r.key))
            .cloned()
            .collect();
        let dropped_refs = old_refs
            .iter()
            .filter(|r| !new_refs.iter().any(|new| new.key == r.key));

        let claimed = self.claim::<E>(id, added_refs).await?;

        let fields: Vec<(String, String)> = updated
            .to_fields()
            .into_iter()
            .filter(|(name, _)| {
                name == field::UPDATED_AT || touched.iter().any(|t| *t == name.as_str())
            })
            .collect();

        let mut batch = WriteBatch::new();
        batch.push(Mutation::HashSet {
            key: updated.record_key(),
            fields,
        });

        let old_entries: HashSet<IndexEntry> = current.index_entries().into_iter().collect();
        let new_entries: HashSet<IndexEntry> = updated.index_entries().into_iter().collect();
        let score = updated.created_at().timestamp();
        batch.extend(old_entries.difference(&new_entries).map(IndexEntry::remove));
        batch.extend(new_entries.difference(&old_entries).map(|entry| entry.add(score)));
        batch.extend(dropped_refs.map(|r| Mutation::Delete { key: r.key.clone() }));
        batch.extend(confirm_claims(id, &claimed));
        batch.extend(related);

        if let Err(e) = self.store.apply(batch).await {
            self.release(&claimed).await;
            return Err(e.into());
        }

        tracing::info!("Updated {} {} ({})", E::KIND, id, touched.join(", "));
        Ok(updated)
    }

    /// Mutations removing an entity: its record, every listing entry and every unique reference.
    pub fn removal_plan<E: Entity>(&self, entity: &E) -> Vec<Mutation> {
        let mut mutations = vec![
            Mutation::Delete {
                key: entity.record_key(),
            },
            global_entry::<E>(entity.id()).remove(),
        ];
        mutations.extend(entity.index_entries().iter().map(IndexEntry::remove));
        mutations.extend(
            entity
                .unique_refs()
                .into_iter()
                .map(|r| Mutation::Delete { key: r.key }),
        );
        mutations
    }

    /// Deletes an entity, committing `related` cleanup in the same batch.
    ///
    /// # Arguments
    /// - `entity` - The entity as loaded by the caller
    /// - `related` - Cascading mutations (relation edges, dependent entities)
    ///
    /// # Returns
    /// - `Ok(())` - The entity and every listing entry referencing it were removed
    /// - `Err(AppError::StoreErr)` - Store error; nothing was removed
    pub async fn delete_with<E: Entity>(
        &self,
        entity: &E,
        related: Vec<Mutation>,
    ) -> Result<(), AppError> {
        let mut batch: WriteBatch = self.removal_plan(entity).into_iter().collect();
        batch.extend(related);

        self.store.apply(batch).await?;

        tracing::info!("Deleted {} {}", E::KIND, entity.id());
        Ok(())
    }

    /// Loads the entities with the given IDs, skipping IDs whose record no longer exists.
    ///
    /// Listings may briefly hold IDs of entities deleted mid-cleanup; such IDs are logged and
    /// left out of the result rather than failing the whole read.
    pub async fn load_many<E: Entity>(&self, ids: &[u64]) -> Result<Vec<E>, AppError> {
        let mut entities = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.find::<E>(id).await? {
                Some(entity) => entities.push(entity),
                None => tracing::warn!("Skipping dangling {} {} in listing", E::KIND, id),
            }
        }
        Ok(entities)
    }

    /// Loads a page of the listing at `key`, in listing order.
    ///
    /// # Arguments
    /// - `key` - Listing key
    /// - `offset` - Number of listing entries to skip
    /// - `count` - Page size; values of zero or less use the default page size
    pub async fn list<E: Entity>(
        &self,
        key: &str,
        offset: u64,
        count: i64,
    ) -> Result<Vec<E>, AppError> {
        let ids = IndexRepository::new(self.store)
            .range_ids(key, offset, count)
            .await?;
        self.load_many(&ids).await
    }

    /// Loads every entity of the listing at `key`.
    pub async fn list_all<E: Entity>(&self, key: &str) -> Result<Vec<E>, AppError> {
        let ids = IndexRepository::new(self.store).all_ids(key).await?;
        self.load_many(&ids).await
    }

    /// Claims each reference for entity `id`, all or nothing.
    ///
    /// References held by a stale claim are taken over, see
    /// [`take_over_stale`](Self::take_over_stale).
    async fn claim<E: Entity>(
        &self,
        id: u64,
        refs: Vec<UniqueRef>,
    ) -> Result<Vec<UniqueRef>, AppError> {
        let holder = id.to_string();
        let mut claimed = Vec::with_capacity(refs.len());

        for unique in refs {
            let result = match self.store.set_nx(&unique.key, &holder, CLAIM_LEASE).await {
                Ok(true) => Ok(true),
                Ok(false) => self.take_over_stale::<E>(&unique.key, &holder).await,
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(true) => claimed.push(unique),
                Ok(false) => {
                    self.release(&claimed).await;
                    return Err(AppError::Conflict(unique.label));
                }
                Err(e) => {
                    self.release(&claimed).await;
                    return Err(e);
                }
            }
        }

        Ok(claimed)
    }

    /// Takes over the claim at `key` for `holder` if its current holder is not a live entity.
    ///
    /// A claim still under lease belongs to a write in progress and is never taken. A claim
    /// without a lease was confirmed together with its holder's record, so a missing record
    /// means the holder is gone. The rewrite only happens while the key still names the holder
    /// that was checked.
    ///
    /// # Returns
    /// - `Ok(true)` - The claim now belongs to `holder`, under a fresh lease
    /// - `Ok(false)` - The claim is live, or changed hands while it was being checked
    async fn take_over_stale<E: Entity>(&self, key: &str, holder: &str) -> Result<bool, AppError> {
        let Some(current) = self.store.get(key).await? else {
            // released in the meantime
            return Ok(self.store.set_nx(key, holder, CLAIM_LEASE).await?);
        };

        // The lease must be checked before the record: a claim is confirmed in the same batch
        // that writes its holder's record.
        if self.store.has_expiry(key).await? {
            return Ok(false);
        }
        let Ok(current_id) = current.parse::<u64>() else {
            tracing::warn!("Claim {} holds non-numeric value {:?}", key, current);
            return Ok(false);
        };
        if self.exists::<E>(current_id).await? {
            return Ok(false);
        }

        let taken = self
            .store
            .compare_and_set(key, &current, holder, CLAIM_LEASE)
            .await?;
        if taken {
            tracing::warn!(
                "Took over stale claim {} from missing {} {}",
                key,
                E::KIND,
                current_id
            );
        }
        Ok(taken)
    }

    /// Releases claims made by a write that did not commit. Failures are logged, since the
    /// caller is already reporting the error that caused the release.
    async fn release(&self, claimed: &[UniqueRef]) {
        if claimed.is_empty() {
            return;
        }

        let batch: WriteBatch = claimed
            .iter()
            .map(|r| Mutation::Delete { key: r.key.clone() })
            .collect();

        match self.store.apply(batch).await {
            Ok(()) => tracing::warn!("Released {} uncommitted claim(s)", claimed.len()),
            Err(e) => tracing::error!("Failed to release uncommitted claims: {}", e),
        }
    }
}

/// Rewrites claims without their lease, making them permanent once the batch commits.
fn confirm_claims(id: u64, claimed: &[UniqueRef]) -> Vec<Mutation> {
    claimed
        .iter()
        .map(|r| Mutation::Set {
            key: r.key.clone(),
            value: id.to_string(),
        })
        .collect()
}

fn global_entry<E: Entity>(id: u64) -> IndexEntry {
    IndexEntry::id(E::KIND.listing_key(), id)
}

fn not_found(kind: EntityKind, id: u64) -> AppError {
    let name = match kind {
        EntityKind::User => "User",
        EntityKind::Resource => "Resource",
        EntityKind::Booking => "Booking",
    };
    AppError::NotFound(format!("{} {} not found", name, id))
}
