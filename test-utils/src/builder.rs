use crate::{context::TestContext, error::TestError, factory::user::UserFactory};

/// Builder for creating test contexts with optional seed data.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
///
/// let test = TestBuilder::new()
///     .with_users(2)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// Number of users written by `build()`, with IDs `1..=users`.
    users: u64,
}

impl TestBuilder {
    /// Creates a new test builder with no seed data.
    ///
    /// # Returns
    /// - New `TestBuilder` instance
    pub fn new() -> Self {
        Self { users: 0 }
    }

    /// Seeds `count` users with default fields.
    ///
    /// Users are written in order, so they receive IDs `1..=count` from the user counter.
    ///
    /// # Arguments
    /// - `count` - Number of users to create
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_users(mut self, count: u64) -> Self {
        self.users = count;
        self
    }

    /// Builds the test context and writes the configured seed data.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Ready-to-use test context
    /// - `Err(TestError::Store)` - A seed write failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let test = TestContext::new();

        for _ in 0..self.users {
            UserFactory::new(&test.store).build().await?;
        }

        Ok(test)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
