//! Repository layer over the key-value store.
//!
//! Repositories hold a reference to the injected store handle and translate entity-level
//! operations into store primitives. The layer is generic: one [`entity::EntityRepository`]
//! serves every entity kind, driven by the kind's [`entity::Entity`] implementation, which
//! declares the record encoding, the listings the entity belongs to, and the unique references
//! it holds.
//!
//! - [`counter`] - per-kind ID allocation
//! - [`index`] - ordered listings (global, per-owner, per-date, per-tag)
//! - [`entity`] - create/read/update/delete with index maintenance
//! - [`relation`] - symmetric user connections and interest tags

pub mod counter;
pub mod entity;
pub mod index;
pub mod relation;

#[cfg(test)]
mod test;
