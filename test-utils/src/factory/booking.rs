//! Booking factory for creating test bookings.

use store::{
    schema::{booking, field, id_member, resource, user, EntityKind},
    KvStore, Mutation, StoreError, WriteBatch,
};

use crate::factory::helpers::{allocate_id, now_seconds};

/// Factory for creating test bookings.
///
/// Writes the record, every listing the application maintains for it and, when both a seat
/// and a date are set, the seat claim.
///
/// # Example
///
/// ```rust,ignore
/// let booking_id = BookingFactory::new(&store, resource_id, user_id)
///     .seat(2)
///     .date("2024-05-01")
///     .build()
///     .await?;
/// ```
pub struct BookingFactory<'a, S: KvStore> {
    store: &'a S,
    resource_id: u64,
    user_id: u64,
    seat_position: Option<u32>,
    date: Option<String>,
    created_at: i64,
}

impl<'a, S: KvStore> BookingFactory<'a, S> {
    /// Creates a new BookingFactory with default values.
    ///
    /// Defaults:
    /// - seat_position: 0
    /// - date: `"2024-05-01"`
    /// - created_at: now
    pub fn new(store: &'a S, resource_id: u64, user_id: u64) -> Self {
        Self {
            store,
            resource_id,
            user_id,
            seat_position: Some(0),
            date: Some("2024-05-01".to_string()),
            created_at: now_seconds(),
        }
    }

    pub fn seat(mut self, seat_position: u32) -> Self {
        self.seat_position = Some(seat_position);
        self
    }

    /// Writes the record without a seat position, as older writers did.
    pub fn without_seat(mut self) -> Self {
        self.seat_position = None;
        self
    }

    /// Sets the booked day, formatted `YYYY-MM-DD`.
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn without_date(mut self) -> Self {
        self.date = None;
        self
    }

    pub fn created_at(mut self, seconds: i64) -> Self {
        self.created_at = seconds;
        self
    }

    /// Builds and writes the booking.
    ///
    /// # Returns
    /// - `Ok(u64)` - ID of the created booking
    /// - `Err(StoreError)` - Store error during the write
    pub async fn build(self) -> Result<u64, StoreError> {
        let id = allocate_id(self.store, EntityKind::Booking).await?;

        let mut fields = vec![
            (field::ID.to_string(), id.to_string()),
            (booking::RESOURCE_ID.to_string(), self.resource_id.to_string()),
            (booking::USER_ID.to_string(), self.user_id.to_string()),
            (field::CREATED_AT.to_string(), self.created_at.to_string()),
        ];
        if let Some(seat) = self.seat_position {
            fields.push((booking::SEAT_POSITION.to_string(), seat.to_string()));
        }
        if let Some(date) = &self.date {
            fields.push((booking::DATE.to_string(), date.clone()));
        }

        let mut listings = vec![
            EntityKind::Booking.listing_key().to_string(),
            resource::bookings_key(self.resource_id),
            user::bookings_key(self.user_id),
        ];
        if let Some(date) = &self.date {
            listings.push(resource::bookings_on_date_key(self.resource_id, date));
            listings.push(user::bookings_on_date_key(self.user_id, date));
        }

        let mut batch = WriteBatch::new();
        batch.push(Mutation::HashSet {
            key: EntityKind::Booking.record_key(id),
            fields,
        });
        batch.extend(listings.into_iter().map(|key| Mutation::SortedAdd {
            key,
            score: self.created_at,
            member: id_member(id),
        }));
        if let (Some(seat), Some(date)) = (self.seat_position, &self.date) {
            batch.push(Mutation::Set {
                key: resource::seat_key(self.resource_id, date, seat),
                value: id.to_string(),
            });
        }
        self.store.apply(batch).await?;

        Ok(id)
    }
}

/// Creates a booking of seat 0 on 2024-05-01.
pub async fn create_booking<S: KvStore>(
    store: &S,
    resource_id: u64,
    user_id: u64,
) -> Result<u64, StoreError> {
    BookingFactory::new(store, resource_id, user_id).build().await
}
