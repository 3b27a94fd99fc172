//! Typed entity models and the parameter types accepted by the services.
//!
//! Each entity implements [`Entity`](crate::data::entity::Entity), which is the single
//! conversion boundary between the typed model and the store's flat string records.

pub mod booking;
pub mod resource;
pub mod user;
