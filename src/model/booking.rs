//! Booking models.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use store::schema::{booking, field, resource, user, EntityKind};

use crate::{
    data::{
        entity::{Entity, UniqueRef},
        index::IndexEntry,
    },
    error::{record::RecordError, AppError},
    util::{
        form::FormReader,
        parse::format_date,
        record::{encode_fields, encode_timestamp, FieldReader},
    },
};

/// A seat booked by a user on a resource.
///
/// `seat_position` and `date` are always written for new bookings, but records created by
/// older writers may lack them: such a booking occupies no seat and has no per-date listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    #[serde(rename = "resourceID")]
    pub resource_id: u64,
    #[serde(rename = "userID")]
    pub user_id: u64,
    pub seat_position: Option<u32>,
    pub date: Option<NaiveDate>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    fn date_key(&self) -> Option<String> {
        self.date.as_ref().map(format_date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBookingParam {
    pub resource_id: u64,
    /// ID of the user booking, and thereby owning, the seat.
    pub user_id: u64,
    pub seat_position: u32,
    pub date: NaiveDate,
}

impl CreateBookingParam {
    /// Reads creation parameters from a caller-supplied field map.
    ///
    /// # Returns
    /// - `Ok(CreateBookingParam)` - Parsed parameters
    /// - `Err(AppError::MissingRequiredField)` - `resourceID`, `userID`, `seatPosition` or
    ///   `date` is absent
    /// - `Err(AppError::BadRequest)` - A number or date failed to parse
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let form = FormReader::new(fields);

        Ok(Self {
            resource_id: form.required_u64(booking::RESOURCE_ID)?,
            user_id: form.required_u64(booking::USER_ID)?,
            seat_position: form.required_u32(booking::SEAT_POSITION)?,
            date: form
                .date(booking::DATE)?
                .ok_or(AppError::MissingRequiredField(booking::DATE))?,
        })
    }
}

/// Moves a booking to another seat or day. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBookingParam {
    pub id: u64,
    pub seat_position: Option<u32>,
    pub date: Option<NaiveDate>,
}

impl UpdateBookingParam {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Reads update parameters from a caller-supplied field map.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let form = FormReader::new(fields);

        Ok(Self {
            id: form.key()?,
            seat_position: form.u32(booking::SEAT_POSITION)?,
            date: form.date(booking::DATE)?,
        })
    }
}

/// Listing a booking query reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOwner {
    Resource(u64),
    User(u64),
}

impl BookingOwner {
    /// Key of the listing, narrowed to a single day when `date` is given.
    pub fn listing_key(&self, date: Option<&NaiveDate>) -> String {
        match (self, date.map(format_date)) {
            (Self::Resource(id), None) => resource::bookings_key(*id),
            (Self::Resource(id), Some(date)) => resource::bookings_on_date_key(*id, &date),
            (Self::User(id), None) => user::bookings_key(*id),
            (Self::User(id), Some(date)) => user::bookings_on_date_key(*id, &date),
        }
    }
}

impl Entity for Booking {
    type Draft = CreateBookingParam;
    type Patch = UpdateBookingParam;

    const KIND: EntityKind = EntityKind::Booking;

    fn from_draft(id: u64, created_at: DateTime<Utc>, draft: Self::Draft) -> Self {
        Self {
            id,
            resource_id: draft.resource_id,
            user_id: draft.user_id,
            seat_position: Some(draft.seat_position),
            date: Some(draft.date),
            created_at,
            updated_at: None,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) -> Result<Vec<&'static str>, AppError> {
        let mut touched = Vec::new();
        if let Some(seat_position) = patch.seat_position {
            self.seat_position = Some(seat_position);
            touched.push(booking::SEAT_POSITION);
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
            touched.push(booking::DATE);
        }
        Ok(touched)
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    fn to_fields(&self) -> Vec<(String, String)> {
        encode_fields([
            (field::ID, Some(self.id.to_string())),
            (booking::RESOURCE_ID, Some(self.resource_id.to_string())),
            (booking::USER_ID, Some(self.user_id.to_string())),
            (booking::SEAT_POSITION, self.seat_position.map(|s| s.to_string())),
            (booking::DATE, self.date_key()),
            (field::CREATED_AT, Some(encode_timestamp(&self.created_at))),
            (field::UPDATED_AT, self.updated_at.as_ref().map(encode_timestamp)),
        ])
    }

    fn from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Self, RecordError> {
        let record = FieldReader::new(key, fields);

        Ok(Self {
            id: record.required_u64(field::ID)?,
            resource_id: record.required_u64(booking::RESOURCE_ID)?,
            user_id: record.required_u64(booking::USER_ID)?,
            seat_position: record.optional_u32(booking::SEAT_POSITION)?,
            date: record.optional_date(booking::DATE)?,
            created_at: record.required_timestamp(field::CREATED_AT)?,
            updated_at: record.optional_timestamp(field::UPDATED_AT)?,
        })
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        let mut entries = vec![
            IndexEntry::id(resource::bookings_key(self.resource_id), self.id),
            IndexEntry::id(user::bookings_key(self.user_id), self.id),
        ];
        if let Some(date) = self.date_key() {
            entries.push(IndexEntry::id(
                resource::bookings_on_date_key(self.resource_id, &date),
                self.id,
            ));
            entries.push(IndexEntry::id(
                user::bookings_on_date_key(self.user_id, &date),
                self.id,
            ));
        }
        entries
    }

    fn unique_refs(&self) -> Vec<UniqueRef> {
        match (self.date_key(), self.seat_position) {
            (Some(date), Some(seat)) => vec![UniqueRef::new(
                resource::seat_key(self.resource_id, &date, seat),
                format!(
                    "Seat {} of resource {} is already booked on {}",
                    seat, self.resource_id, date
                ),
            )],
            _ => Vec::new(),
        }
    }
}
