//! Reading caller-supplied field maps.
//!
//! The web layer hands the core a flat `field -> value` map. Empty values count as absent,
//! so a form that submits an empty input leaves the stored field untouched.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    error::AppError,
    util::parse::{parse_date, parse_time, parse_u32, parse_u64},
};

/// Typed view over a caller-supplied field map.
pub struct FormReader<'a> {
    fields: &'a HashMap<String, String>,
}

impl<'a> FormReader<'a> {
    pub fn new(fields: &'a HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn str(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn required_str(&self, field: &'static str) -> Result<String, AppError> {
        self.str(field).ok_or(AppError::MissingRequiredField(field))
    }

    pub fn u64(&self, field: &str) -> Result<Option<u64>, AppError> {
        self.str(field).map(|v| parse_u64(field, &v)).transpose()
    }

    pub fn required_u64(&self, field: &'static str) -> Result<u64, AppError> {
        self.u64(field)?.ok_or(AppError::MissingRequiredField(field))
    }

    pub fn u32(&self, field: &str) -> Result<Option<u32>, AppError> {
        self.str(field).map(|v| parse_u32(field, &v)).transpose()
    }

    pub fn required_u32(&self, field: &'static str) -> Result<u32, AppError> {
        self.u32(field)?.ok_or(AppError::MissingRequiredField(field))
    }

    pub fn date(&self, field: &str) -> Result<Option<NaiveDate>, AppError> {
        self.str(field).map(|v| parse_date(field, &v)).transpose()
    }

    pub fn time(&self, field: &str) -> Result<Option<String>, AppError> {
        self.str(field).map(|v| parse_time(field, &v)).transpose()
    }

    /// Reads the entity ID an update applies to.
    ///
    /// # Returns
    /// - `Ok(u64)` - The parsed ID
    /// - `Err(AppError::MissingKey)` - No `id` was supplied
    /// - `Err(AppError::BadRequest)` - The `id` is not an integer
    pub fn key(&self) -> Result<u64, AppError> {
        self.u64(store::schema::field::ID)?
            .ok_or(AppError::MissingKey(store::schema::field::ID))
    }

    /// Reads a comma-separated list, trimming entries and dropping empty ones.
    pub fn list(&self, field: &str) -> Option<Vec<String>> {
        self.fields.get(field).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
