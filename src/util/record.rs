//! Decoding of stored records.
//!
//! Records are flat string hashes. [`FieldReader`] turns them back into typed values and
//! reports any decoding failure as a [`RecordError`] naming the record key and field.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{error::record::RecordError, util::parse::DATE_FORMAT};

/// Typed view over a stored record.
pub struct FieldReader<'a> {
    key: &'a str,
    fields: &'a HashMap<String, String>,
}

impl<'a> FieldReader<'a> {
    pub fn new(key: &'a str, fields: &'a HashMap<String, String>) -> Self {
        Self { key, fields }
    }

    fn missing(&self, field: &'static str) -> RecordError {
        RecordError::MissingField {
            key: self.key.to_string(),
            field,
        }
    }

    pub fn optional_str(&self, field: &'static str) -> Option<String> {
        self.fields.get(field).cloned()
    }

    pub fn required_str(&self, field: &'static str) -> Result<String, RecordError> {
        self.optional_str(field).ok_or_else(|| self.missing(field))
    }

    pub fn optional_u64(&self, field: &'static str) -> Result<Option<u64>, RecordError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => value
                .parse::<u64>()
                .map(Some)
                .map_err(|source| RecordError::InvalidInteger {
                    key: self.key.to_string(),
                    field,
                    value: value.clone(),
                    source,
                }),
        }
    }

    pub fn required_u64(&self, field: &'static str) -> Result<u64, RecordError> {
        self.optional_u64(field)?.ok_or_else(|| self.missing(field))
    }

    pub fn optional_u32(&self, field: &'static str) -> Result<Option<u32>, RecordError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => value
                .parse::<u32>()
                .map(Some)
                .map_err(|source| RecordError::InvalidInteger {
                    key: self.key.to_string(),
                    field,
                    value: value.clone(),
                    source,
                }),
        }
    }

    pub fn required_u32(&self, field: &'static str) -> Result<u32, RecordError> {
        self.optional_u32(field)?.ok_or_else(|| self.missing(field))
    }

    pub fn optional_date(&self, field: &'static str) -> Result<Option<NaiveDate>, RecordError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map(Some)
                .map_err(|source| RecordError::InvalidDate {
                    key: self.key.to_string(),
                    field,
                    value: value.clone(),
                    source,
                }),
        }
    }

    /// Reads a timestamp stored as unix seconds.
    pub fn optional_timestamp(
        &self,
        field: &'static str,
    ) -> Result<Option<DateTime<Utc>>, RecordError> {
        let Some(raw) = self.fields.get(field) else {
            return Ok(None);
        };

        let seconds = raw
            .parse::<i64>()
            .map_err(|source| RecordError::InvalidInteger {
                key: self.key.to_string(),
                field,
                value: raw.clone(),
                source,
            })?;

        DateTime::from_timestamp(seconds, 0)
            .map(Some)
            .ok_or(RecordError::InvalidTimestamp {
                key: self.key.to_string(),
                field,
                value: seconds,
            })
    }

    pub fn required_timestamp(&self, field: &'static str) -> Result<DateTime<Utc>, RecordError> {
        self.optional_timestamp(field)?
            .ok_or_else(|| self.missing(field))
    }
}

/// Encodes a timestamp the way [`FieldReader::optional_timestamp`] reads it.
pub fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.timestamp().to_string()
}

/// Collects `(field, value)` pairs into the owned form the store expects, skipping absent
/// optional values.
pub fn encode_fields<I>(fields: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'static str, Option<String>)>,
{
    fields
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
        .collect()
}
