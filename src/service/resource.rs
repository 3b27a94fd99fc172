//! Resource service for business logic.
//!
//! Manages bookable resources and answers availability queries. Only the owner of a resource
//! may change or delete it.

use chrono::NaiveDate;
use store::{
    schema::{resource, user, EntityKind},
    KvStore,
};

use crate::{
    data::entity::EntityRepository,
    error::AppError,
    model::{
        booking::Booking,
        resource::{CreateResourceParam, Resource, UpdateResourceParam},
        user::User,
    },
    service::{availability, cascade::CascadePlanner},
    util::parse::format_date,
};

/// Service providing business logic for bookable resources.
pub struct ResourceService<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> ResourceService<'a, S> {
    /// Creates a new ResourceService instance.
    ///
    /// # Arguments
    /// - `store` - Reference to the store handle
    ///
    /// # Returns
    /// - `ResourceService` - New service instance
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Creates a resource owned by `param.user_id`.
    ///
    /// # Returns
    /// - `Ok(Resource)` - The new resource with its assigned ID
    /// - `Err(AppError::MissingRequiredField)` - The name is empty
    /// - `Err(AppError::BadRequest)` - Capacity is zero
    /// - `Err(AppError::NotFound)` - The owning user does not exist
    /// - `Err(AppError::StoreErr)` - Store error during the write
    pub async fn insert_resource(&self, param: CreateResourceParam) -> Result<Resource, AppError> {
        let entities = EntityRepository::new(self.store);

        if !entities.exists::<User>(param.user_id).await? {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                param.user_id
            )));
        }

        entities.insert::<Resource>(param).await
    }

    /// Retrieves a resource by ID.
    ///
    /// # Returns
    /// - `Ok(Resource)` - The resource
    /// - `Err(AppError::NotFound)` - No resource with the ID exists
    /// - `Err(AppError::CorruptRecord)` - The stored record failed to decode
    pub async fn get_resource(&self, id: u64) -> Result<Resource, AppError> {
        EntityRepository::new(self.store).get::<Resource>(id).await
    }

    /// Loads a resource and checks that `requesting_user_id` owns it.
    async fn get_owned(&self, id: u64, requesting_user_id: u64) -> Result<Resource, AppError> {
        let resource = self.get_resource(id).await?;
        if resource.user_id != requesting_user_id {
            return Err(AppError::PermissionDenied(format!(
                "User {} does not own resource {}",
                requesting_user_id, id
            )));
        }
        Ok(resource)
    }

    /// Updates the supplied fields of a resource.
    ///
    /// # Arguments
    /// - `param` - ID of the resource and the fields to change
    /// - `requesting_user_id` - User performing the change; must own the resource
    ///
    /// # Returns
    /// - `Ok(Resource)` - The resource as stored after the update
    /// - `Err(AppError::NotFound)` - No resource with the ID exists
    /// - `Err(AppError::PermissionDenied)` - The requesting user is not the owner
    /// - `Err(AppError::BadRequest)` - The new capacity is zero
    pub async fn update_resource(
        &self,
        param: UpdateResourceParam,
        requesting_user_id: u64,
    ) -> Result<Resource, AppError> {
        let current = self.get_owned(param.id, requesting_user_id).await?;

        EntityRepository::new(self.store)
            .update_loaded(current, param, Vec::new())
            .await
    }

    /// Deletes a resource together with every booking on it.
    ///
    /// # Returns
    /// - `Ok(())` - The resource, its bookings and their seat claims were removed
    /// - `Err(AppError::NotFound)` - No resource with the ID exists
    /// - `Err(AppError::PermissionDenied)` - The requesting user is not the owner
    pub async fn delete_resource(&self, id: u64, requesting_user_id: u64) -> Result<(), AppError> {
        let resource = self.get_owned(id, requesting_user_id).await?;

        let related = CascadePlanner::new(self.store).resource(&resource).await?;
        EntityRepository::new(self.store)
            .delete_with(&resource, related)
            .await
    }

    /// Lists resources in creation order.
    pub async fn list_resources(&self, offset: u64, count: i64) -> Result<Vec<Resource>, AppError> {
        let resources = EntityRepository::new(self.store)
            .list::<Resource>(EntityKind::Resource.listing_key(), offset, count)
            .await?;

        tracing::debug!("Listed {} resource(s)", resources.len());
        Ok(resources)
    }

    /// Lists the resources owned by a user, in creation order.
    pub async fn list_resources_by_owner(
        &self,
        user_id: u64,
        offset: u64,
        count: i64,
    ) -> Result<Vec<Resource>, AppError> {
        EntityRepository::new(self.store)
            .list::<Resource>(&user::resources_key(user_id), offset, count)
            .await
    }

    /// Free seats of a resource on a day.
    ///
    /// Reads the bookings listed under the resource and day, and removes their seats from
    /// the resource's seat domain.
    ///
    /// # Returns
    /// - `Ok(Vec<u32>)` - Free seat positions in ascending order
    /// - `Err(AppError::NotFound)` - No resource with the ID exists
    pub async fn available_seats(
        &self,
        resource_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<u32>, AppError> {
        let entities = EntityRepository::new(self.store);
        let resource = entities.get::<Resource>(resource_id).await?;

        let key = resource::bookings_on_date_key(resource_id, &format_date(&date));
        let bookings = entities.list_all::<Booking>(&key).await?;

        let seats = availability::available_seats(
            resource.capacity,
            bookings.iter().map(|booking| booking.seat_position),
        );

        tracing::debug!(
            "Resource {} has {} free seat(s) on {}",
            resource_id,
            seats.len(),
            date
        );
        Ok(seats)
    }
}
