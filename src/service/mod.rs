//! Service layer.
//!
//! Services are the boundary the excluded web layer calls. They enforce ownership and
//! referential checks, compose repository operations into complete entity mutations, and
//! return typed domain models. Each service borrows the injected store handle and keeps it
//! private, so callers go through the service's operations:
//!
//! ```compile_fail
//! use longtable::service::user::UserService;
//! use store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let service = UserService::new(&store);
//! let _handle = service.store;
//! ```

pub mod availability;
pub mod booking;
pub mod identity;
pub mod maintenance;
pub mod resource;
pub mod user;

mod cascade;
