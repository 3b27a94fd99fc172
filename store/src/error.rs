use thiserror::Error;

/// Failure talking to the underlying store.
///
/// Always fatal to the current operation; nothing in the workspace retries internally.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection or command error reported by the redis client.
    #[error(transparent)]
    Redis(#[from] ::redis::RedisError),

    /// A value stored under `key` has the wrong shape for the requested command.
    ///
    /// Mirrors redis' WRONGTYPE reply for the in-memory backend, and is also returned when a
    /// counter holds a non-integer value.
    #[error("Wrong type of value stored at key '{key}'")]
    WrongType {
        /// The offending key
        key: String,
    },
}
