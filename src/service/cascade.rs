//! Removal plans for entities that own other entities.

use store::{
    schema::{resource, user},
    KvStore, Mutation,
};

use crate::{
    data::{
        entity::EntityRepository,
        relation::{detach_plan, RelationRepository},
    },
    error::AppError,
    model::{booking::Booking, resource::Resource, user::User},
};

/// Builds the mutations that remove everything depending on an entity.
///
/// Plans are read-then-write: they reflect the listings at the time they are built and are
/// committed by the caller together with the removal of the entity itself.
pub(crate) struct CascadePlanner<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> CascadePlanner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Removes every booking listed under `key`, then the listing itself.
    async fn bookings_in(&self, key: String) -> Result<Vec<Mutation>, AppError> {
        let entities = EntityRepository::new(self.store);
        let bookings: Vec<Booking> = entities.list_all(&key).await?;

        let mut mutations: Vec<Mutation> = bookings
            .iter()
            .flat_map(|booking| entities.removal_plan(booking))
            .collect();
        mutations.push(Mutation::Delete { key });

        Ok(mutations)
    }

    /// Everything depending on a resource: its bookings, their listings and seat claims.
    pub async fn resource(&self, resource: &Resource) -> Result<Vec<Mutation>, AppError> {
        self.bookings_in(resource::bookings_key(resource.id)).await
    }

    /// Everything depending on a user: their bookings, the resources they own with all
    /// bookings on them, their connection edges and their interest tags.
    pub async fn user(&self, user: &User) -> Result<Vec<Mutation>, AppError> {
        let entities = EntityRepository::new(self.store);

        let mut mutations = self.bookings_in(user::bookings_key(user.id)).await?;

        let owned_key = user::resources_key(user.id);
        let owned: Vec<Resource> = entities.list_all(&owned_key).await?;
        for resource in &owned {
            mutations.extend(entities.removal_plan(resource));
            mutations.extend(self.resource(resource).await?);
        }
        mutations.push(Mutation::Delete { key: owned_key });

        let relations = RelationRepository::new(self.store);
        let neighbors = relations.neighbors(user.id).await?;
        let tags = relations.tags_of_user(user.id).await?;
        mutations.extend(detach_plan(user.id, &neighbors, &tags));

        Ok(mutations)
    }
}
