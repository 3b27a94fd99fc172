//! Booking service for business logic.
//!
//! Bookings are validated against a fresh read of their resource and claim their seat for
//! the day before being written, so one seat holds at most one booking per day even under
//! concurrent requests.

use chrono::NaiveDate;
use store::KvStore;

use crate::{
    data::entity::EntityRepository,
    error::AppError,
    model::{
        booking::{Booking, BookingOwner, CreateBookingParam, UpdateBookingParam},
        resource::Resource,
        user::User,
    },
};

/// Service providing business logic for seat bookings.
pub struct BookingService<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> BookingService<'a, S> {
    /// Creates a new BookingService instance.
    ///
    /// # Arguments
    /// - `store` - Reference to the store handle
    ///
    /// # Returns
    /// - `BookingService` - New service instance
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn check_seat(resource: &Resource, seat_position: u32) -> Result<(), AppError> {
        if !resource.has_seat(seat_position) {
            return Err(AppError::BadRequest(format!(
                "Seat {} is outside resource {} (capacity {})",
                seat_position, resource.id, resource.capacity
            )));
        }
        Ok(())
    }

    /// Books a seat of a resource for a day.
    ///
    /// # Arguments
    /// - `param` - Resource, booking user, seat position and day
    ///
    /// # Returns
    /// - `Ok(Booking)` - The new booking with its assigned ID
    /// - `Err(AppError::NotFound)` - The resource or the user does not exist
    /// - `Err(AppError::BadRequest)` - The seat position is not below the resource's capacity
    /// - `Err(AppError::Conflict)` - The seat is already booked on that day
    /// - `Err(AppError::StoreErr)` - Store error during the read or write
    pub async fn insert_booking(&self, param: CreateBookingParam) -> Result<Booking, AppError> {
        let entities = EntityRepository::new(self.store);

        let resource = entities.get::<Resource>(param.resource_id).await?;
        Self::check_seat(&resource, param.seat_position)?;

        if !entities.exists::<User>(param.user_id).await? {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                param.user_id
            )));
        }

        entities.insert::<Booking>(param).await
    }

    /// Retrieves a booking by ID.
    pub async fn get_booking(&self, id: u64) -> Result<Booking, AppError> {
        EntityRepository::new(self.store).get::<Booking>(id).await
    }

    async fn get_owned(&self, id: u64, requesting_user_id: u64) -> Result<Booking, AppError> {
        let booking = self.get_booking(id).await?;
        if booking.user_id != requesting_user_id {
            return Err(AppError::PermissionDenied(format!(
                "User {} does not own booking {}",
                requesting_user_id, id
            )));
        }
        Ok(booking)
    }

    /// Moves a booking to another seat and/or day.
    ///
    /// The new seat is claimed before the move is committed and the old claim is released in
    /// the same batch as the move.
    ///
    /// # Returns
    /// - `Ok(Booking)` - The booking as stored after the move
    /// - `Err(AppError::NotFound)` - The booking or its resource does not exist
    /// - `Err(AppError::PermissionDenied)` - The requesting user does not own the booking
    /// - `Err(AppError::BadRequest)` - The new seat is not below the resource's capacity
    /// - `Err(AppError::Conflict)` - The target seat is already booked on the target day
    pub async fn update_booking(
        &self,
        param: UpdateBookingParam,
        requesting_user_id: u64,
    ) -> Result<Booking, AppError> {
        let current = self.get_owned(param.id, requesting_user_id).await?;

        if let Some(seat_position) = param.seat_position {
            let resource = EntityRepository::new(self.store)
                .get::<Resource>(current.resource_id)
                .await?;
            Self::check_seat(&resource, seat_position)?;
        }

        EntityRepository::new(self.store)
            .update_loaded(current, param, Vec::new())
            .await
    }

    /// Cancels a booking, releasing its seat.
    ///
    /// # Arguments
    /// - `id` - ID of the booking
    /// - `requesting_user_id` - User cancelling; must be the user who made the booking
    ///
    /// # Returns
    /// - `Ok(())` - The booking and all its listing entries were removed
    /// - `Err(AppError::NotFound)` - No booking with the ID exists
    /// - `Err(AppError::PermissionDenied)` - The requesting user does not own the booking
    pub async fn delete_booking(&self, id: u64, requesting_user_id: u64) -> Result<(), AppError> {
        let booking = self.get_owned(id, requesting_user_id).await?;

        EntityRepository::new(self.store)
            .delete_with(&booking, Vec::new())
            .await
    }

    /// Lists the bookings of a resource or of a user, optionally for a single day.
    ///
    /// # Arguments
    /// - `owner` - Resource or user whose bookings to list
    /// - `date` - Day to restrict the listing to
    /// - `offset` - Number of bookings to skip
    /// - `count` - Page size; values of zero or less use the default page size
    pub async fn list_bookings(
        &self,
        owner: BookingOwner,
        date: Option<NaiveDate>,
        offset: u64,
        count: i64,
    ) -> Result<Vec<Booking>, AppError> {
        let key = owner.listing_key(date.as_ref());
        let bookings = EntityRepository::new(self.store)
            .list::<Booking>(&key, offset, count)
            .await?;

        tracing::debug!("Listed {} booking(s) from {}", bookings.len(), key);
        Ok(bookings)
    }
}
