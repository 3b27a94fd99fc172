use std::num::ParseIntError;
use thiserror::Error;

/// Stored data that failed to decode, indicating a corrupt or foreign-written record.
#[derive(Error, Debug)]
pub enum RecordError {
    /// A field every record of this kind carries is absent.
    #[error("Record '{key}' is missing field '{field}'")]
    MissingField {
        /// Key of the record
        key: String,
        /// Stored field name
        field: &'static str,
    },

    /// An integer field holds a non-integer value.
    #[error("Failed to parse field '{field}' of record '{key}' from '{value}': {source}")]
    InvalidInteger {
        /// Key of the record
        key: String,
        /// Stored field name
        field: &'static str,
        /// The raw stored value
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// A date field is not a `YYYY-MM-DD` calendar day.
    #[error("Failed to parse date field '{field}' of record '{key}' from '{value}': {source}")]
    InvalidDate {
        /// Key of the record
        key: String,
        /// Stored field name
        field: &'static str,
        /// The raw stored value
        value: String,
        /// The underlying parse error
        #[source]
        source: chrono::ParseError,
    },

    /// A timestamp field holds seconds outside the representable range.
    #[error("Timestamp field '{field}' of record '{key}' is out of range: {value}")]
    InvalidTimestamp {
        /// Key of the record
        key: String,
        /// Stored field name
        field: &'static str,
        /// The stored seconds
        value: i64,
    },

    /// A listing contains a member that is not an entity ID.
    #[error("Listing '{key}' contains invalid member '{member}'")]
    InvalidListingMember {
        /// Key of the listing
        key: String,
        /// The raw member
        member: String,
    },
}
