//! Error types for the persistence core.
//!
//! `AppError` is the single error type returned by every repository and service operation.
//! Its variants follow the caller-facing taxonomy: the excluded web layer matches on them to
//! pick a status code, and the core itself never writes to a transport.

pub mod config;
pub mod record;

use thiserror::Error;

use crate::error::{config::ConfigError, record::RecordError};

/// Top-level application error type.
///
/// Most infrastructure variants use `#[from]` for automatic conversion; the domain variants
/// carry a short message naming what was missing, absent, or forbidden.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Underlying store failure (unreachable server, command error).
    ///
    /// Always fatal to the current call; never retried internally.
    #[error(transparent)]
    StoreErr(#[from] store::StoreError),

    /// A stored value failed to decode to its expected type.
    ///
    /// Never silently defaulted: the record is reported as corrupt instead.
    #[error(transparent)]
    CorruptRecord(#[from] RecordError),

    /// The caller omitted a field the operation requires.
    ///
    /// # Fields
    /// - Stored name of the missing field
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The operation needs an entity ID that wasn't supplied.
    ///
    /// # Fields
    /// - Name of the missing key
    #[error("Missing key: {0}")]
    MissingKey(&'static str),

    /// The requested entity does not exist.
    ///
    /// # Fields
    /// - Message describing what was not found
    #[error("{0}")]
    NotFound(String),

    /// The acting user does not own the entity being mutated.
    ///
    /// # Fields
    /// - Message describing the refused action
    #[error("{0}")]
    PermissionDenied(String),

    /// A unique reference (email address, seat on a date) is already held by another entity.
    ///
    /// # Fields
    /// - Message describing the conflicting reference
    #[error("{0}")]
    Conflict(String),

    /// Caller input is outside the domain the operation accepts.
    ///
    /// # Fields
    /// - Message describing what was invalid about the input
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// Returns true for errors caused by the caller's input or permissions rather than by the
    /// store or by corrupt data.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField(_)
                | Self::MissingKey(_)
                | Self::NotFound(_)
                | Self::PermissionDenied(_)
                | Self::Conflict(_)
                | Self::BadRequest(_)
        )
    }
}
