//! Factories for writing test data straight into the store.
//!
//! Each factory allocates its ID from the same counter the application uses and writes the
//! record together with every listing entry the application would maintain for it. Builders
//! expose the fields tests commonly vary; everything else gets a sensible default.
//!
//! - `user` - Users, with email reference and interest tags
//! - `resource` - Bookable resources and their owner listing
//! - `booking` - Bookings with their per-resource, per-user and per-date listings
//! - `helpers` - Raw record, listing and claim writers

pub mod booking;
pub mod helpers;
pub mod resource;
pub mod user;

pub use booking::create_booking;
pub use resource::create_resource;
pub use user::create_user;
