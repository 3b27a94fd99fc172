//! Persistence core for the longtable seat-booking service.
//!
//! Users own bookable resources (long tables with numbered seats) and book seats on them for
//! a given day. Everything is stored in a key-value store that only offers strings, hashes and
//! sorted sets; this crate layers unique IDs, secondary listings, cascading deletes and
//! many-to-many relations on top of it.
//!
//! # Architecture
//!
//! The crate follows a layered architecture:
//!
//! - **Service Layer** ([`service`]): ownership checks, referential checks and composition of
//!   complete entity mutations. This is the interface the web layer calls.
//! - **Data Layer** ([`data`]): repositories over the store. A single generic entity
//!   repository serves every kind, plus listings, counters and the relation graph.
//! - **Model Layer** ([`model`]): typed entities and parameter types, and their conversion to
//!   and from stored records.
//!
//! # Supporting Modules
//!
//! - [`config`] - Environment configuration
//! - [`error`] - Error types
//! - [`startup`] - Tracing and store initialization
//! - [`state`] - The shared handle the web layer holds
//! - [`util`] - Parsing of caller input and stored records
//!
//! The store primitives, the key layout and the redis and in-memory backends live in the
//! `store` crate.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
