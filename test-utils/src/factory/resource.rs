//! Resource factory for creating test resources.

use store::{
    schema::{field, id_member, resource, user, EntityKind},
    KvStore, Mutation, StoreError, WriteBatch,
};

use crate::factory::helpers::{allocate_id, next_id, now_seconds};

/// Factory for creating test resources owned by an existing user.
pub struct ResourceFactory<'a, S: KvStore> {
    store: &'a S,
    user_id: u64,
    name: String,
    capacity: u32,
    created_at: i64,
}

impl<'a, S: KvStore> ResourceFactory<'a, S> {
    /// Creates a new ResourceFactory with default values.
    ///
    /// Defaults:
    /// - name: `"Table {n}"` where n is auto-incremented
    /// - capacity: 4
    /// - created_at: now
    ///
    /// # Arguments
    /// - `store` - Store to write the resource to
    /// - `user_id` - ID of the owning user
    pub fn new(store: &'a S, user_id: u64) -> Self {
        Self {
            store,
            user_id,
            name: format!("Table {}", next_id()),
            capacity: 4,
            created_at: now_seconds(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn created_at(mut self, seconds: i64) -> Self {
        self.created_at = seconds;
        self
    }

    /// Builds and writes the resource.
    ///
    /// # Returns
    /// - `Ok(u64)` - ID of the created resource
    /// - `Err(StoreError)` - Store error during the write
    pub async fn build(self) -> Result<u64, StoreError> {
        let id = allocate_id(self.store, EntityKind::Resource).await?;

        let mut batch = WriteBatch::new();
        batch.push(Mutation::HashSet {
            key: EntityKind::Resource.record_key(id),
            fields: vec![
                (field::ID.to_string(), id.to_string()),
                (resource::USER_ID.to_string(), self.user_id.to_string()),
                (resource::NAME.to_string(), self.name),
                (resource::CAPACITY.to_string(), self.capacity.to_string()),
                (field::CREATED_AT.to_string(), self.created_at.to_string()),
            ],
        });
        for key in [
            EntityKind::Resource.listing_key().to_string(),
            user::resources_key(self.user_id),
        ] {
            batch.push(Mutation::SortedAdd {
                key,
                score: self.created_at,
                member: id_member(id),
            });
        }
        self.store.apply(batch).await?;

        Ok(id)
    }
}

/// Creates a resource with default values owned by `user_id`.
pub async fn create_resource<S: KvStore>(store: &S, user_id: u64) -> Result<u64, StoreError> {
    ResourceFactory::new(store, user_id).build().await
}
