//! Longtable Test Utils
//!
//! Provides shared testing utilities for the longtable workspace. Tests run against the
//! in-memory store, which keeps the same ordering and atomicity semantics as redis, so no
//! server is needed.
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment holding the store handle
//! - **TestError**: Error types that can occur during test setup
//! - **factory**: Writers for raw records and listings, laid out the way the store expects
//!
//! Factories write through the store primitives directly rather than through the services,
//! so tests can set up states the services would never produce: records missing optional
//! fields, fixed timestamps, listings pointing at deleted records.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn lists_users() -> Result<(), AppError> {
//!     let test = TestBuilder::new().with_users(3).build().await.unwrap();
//!
//!     let users = UserService::new(&test.store).list_users(0, 0, &[]).await?;
//!     assert_eq!(users.len(), 3);
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
