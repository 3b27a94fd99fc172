//! Application state shared by every caller of the core.
//!
//! `AppState` owns the store handle opened at startup. The web layer clones it into each
//! request handler and asks it for the service it needs; services borrow the handle for the
//! duration of one call. Nothing in the crate reaches the store through a global.

use store::{KvStore, RedisStore};

use crate::service::{
    booking::BookingService, identity::IdentityService, maintenance::MaintenanceService,
    resource::ResourceService, user::UserService,
};

/// Shared handle to the persistence core.
///
/// Cloning is cheap: the redis `ConnectionManager` and the in-memory store both share their
/// underlying connection or keyspace between clones.
#[derive(Clone)]
pub struct AppState<S: KvStore = RedisStore> {
    pub store: S,
}

impl<S: KvStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn users(&self) -> UserService<'_, S> {
        UserService::new(&self.store)
    }

    pub fn resources(&self) -> ResourceService<'_, S> {
        ResourceService::new(&self.store)
    }

    pub fn bookings(&self) -> BookingService<'_, S> {
        BookingService::new(&self.store)
    }

    pub fn identity(&self) -> IdentityService<'_, S> {
        IdentityService::new(&self.store)
    }

    pub fn maintenance(&self) -> MaintenanceService<'_, S> {
        MaintenanceService::new(&self.store)
    }
}

impl AppState<RedisStore> {
    /// Closes the store connection. Called once at shutdown.
    pub fn close(self) {
        self.store.close();
    }
}
