//! Bookable resource (long table) models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use store::schema::{field, resource, user, EntityKind};

use crate::{
    data::{entity::Entity, index::IndexEntry},
    error::{record::RecordError, AppError},
    util::{
        form::FormReader,
        record::{encode_fields, encode_timestamp, FieldReader},
    },
};

/// A bookable resource with `capacity` seats numbered `0..capacity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: u64,
    /// ID of the owning user.
    #[serde(rename = "userID")]
    pub user_id: u64,
    pub name: String,
    pub capacity: u32,
    /// Opening time as `HH:MM`.
    pub opening_time: Option<String>,
    /// Closing time as `HH:MM`.
    pub closing_time: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Whether `seat_position` names one of the resource's seats.
    pub fn has_seat(&self, seat_position: u32) -> bool {
        seat_position < self.capacity
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResourceParam {
    /// ID of the user creating, and thereby owning, the resource.
    pub user_id: u64,
    pub name: String,
    pub capacity: u32,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
}

impl CreateResourceParam {
    /// Reads creation parameters from a caller-supplied field map.
    ///
    /// # Returns
    /// - `Ok(CreateResourceParam)` - Parsed parameters
    /// - `Err(AppError::MissingRequiredField)` - `userID`, `name` or `capacity` is absent
    /// - `Err(AppError::BadRequest)` - A number or time failed to parse
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let form = FormReader::new(fields);

        Ok(Self {
            user_id: form.required_u64(resource::USER_ID)?,
            name: form.required_str(resource::NAME)?,
            capacity: form.required_u32(resource::CAPACITY)?,
            opening_time: form.time(resource::OPENING_TIME)?,
            closing_time: form.time(resource::CLOSING_TIME)?,
        })
    }
}

/// Changes to a resource. `None` fields are left unchanged; the owner cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResourceParam {
    pub id: u64,
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
}

impl UpdateResourceParam {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Reads update parameters from a caller-supplied field map.
    ///
    /// # Returns
    /// - `Ok(UpdateResourceParam)` - Parsed parameters
    /// - `Err(AppError::MissingKey)` - No `id` was supplied
    /// - `Err(AppError::BadRequest)` - A number or time failed to parse
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let form = FormReader::new(fields);

        Ok(Self {
            id: form.key()?,
            name: form.str(resource::NAME),
            capacity: form.u32(resource::CAPACITY)?,
            opening_time: form.time(resource::OPENING_TIME)?,
            closing_time: form.time(resource::CLOSING_TIME)?,
        })
    }
}

fn check_capacity(capacity: u32) -> Result<(), AppError> {
    if capacity == 0 {
        return Err(AppError::BadRequest(
            "Capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

impl Entity for Resource {
    type Draft = CreateResourceParam;
    type Patch = UpdateResourceParam;

    const KIND: EntityKind = EntityKind::Resource;

    fn validate_draft(draft: &Self::Draft) -> Result<(), AppError> {
        if draft.name.trim().is_empty() {
            return Err(AppError::MissingRequiredField(resource::NAME));
        }
        check_capacity(draft.capacity)
    }

    fn from_draft(id: u64, created_at: DateTime<Utc>, draft: Self::Draft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            name: draft.name,
            capacity: draft.capacity,
            opening_time: draft.opening_time,
            closing_time: draft.closing_time,
            created_at,
            updated_at: None,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) -> Result<Vec<&'static str>, AppError> {
        let mut touched = Vec::new();
        if let Some(name) = patch.name {
            self.name = name;
            touched.push(resource::NAME);
        }
        if let Some(capacity) = patch.capacity {
            check_capacity(capacity)?;
            self.capacity = capacity;
            touched.push(resource::CAPACITY);
        }
        if let Some(opening_time) = patch.opening_time {
            self.opening_time = Some(opening_time);
            touched.push(resource::OPENING_TIME);
        }
        if let Some(closing_time) = patch.closing_time {
            self.closing_time = Some(closing_time);
            touched.push(resource::CLOSING_TIME);
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
            (resource::USER_ID, Some(self.user_id.to_string())),
            (resource::NAME, Some(self.name.clone())),
            (resource::CAPACITY, Some(self.capacity.to_string())),
            (resource::OPENING_TIME, self.opening_time.clone()),
            (resource::CLOSING_TIME, self.closing_time.clone()),
            (field::CREATED_AT, Some(encode_timestamp(&self.created_at))),
            (field::UPDATED_AT, self.updated_at.as_ref().map(encode_timestamp)),
        ])
    }

    fn from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Self, RecordError> {
        let record = FieldReader::new(key, fields);

        Ok(Self {
            id: record.required_u64(field::ID)?,
            user_id: record.required_u64(resource::USER_ID)?,
            name: record.required_str(resource::NAME)?,
            capacity: record.required_u32(resource::CAPACITY)?,
            opening_time: record.optional_str(resource::OPENING_TIME),
            closing_time: record.optional_str(resource::CLOSING_TIME),
            created_at: record.required_timestamp(field::CREATED_AT)?,
            updated_at: record.optional_timestamp(field::UPDATED_AT)?,
        })
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::id(user::resources_key(self.user_id), self.id)]
    }
}
