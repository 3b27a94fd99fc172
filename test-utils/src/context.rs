use store::MemoryStore;

/// Test context holding the store a test runs against.
///
/// Every context owns a fresh, empty in-memory keyspace, so tests never observe each other's
/// data. Clones of `store` share the keyspace, which lets a test hand the same store to
/// several concurrent tasks.
pub struct TestContext {
    pub store: MemoryStore,
}

impl TestContext {
    /// Creates a context with an empty store.
    ///
    /// # Returns
    /// - New `TestContext` instance
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    /// Every key currently stored, sorted.
    ///
    /// Useful for asserting that an operation left nothing behind.
    pub async fn keys(&self) -> Vec<String> {
        self.store.keys().await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
