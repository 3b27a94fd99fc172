use store::StoreError;
use thiserror::Error;

/// Errors that can occur while setting up a test environment.
#[derive(Error, Debug)]
pub enum TestError {
    /// The store rejected a factory write.
    #[error(transparent)]
    Store(#[from] StoreError),
}
