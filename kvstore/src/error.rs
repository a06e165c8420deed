use redis::{ErrorKind, RedisError};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by [`crate::Store`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be checked out of the pool in time.
    #[error("unable to get redis connection: {0}")]
    Pool(#[from] r2d2::Error),
    /// IO failure, server error reply, or a reply `FromRedisValue` rejected;
    /// passed through untouched.
    #[error(transparent)]
    Redis(#[from] RedisError),
    /// The key, field, or list element does not exist.
    #[error("nil returned")]
    Nil,
    /// The decode tag is unknown or not supported by the operation.
    #[error("invalid data type")]
    InvalidDataType,
    /// The reply payload could not be converted to the requested type.
    #[error("cannot convert {value:?} to {target}")]
    Conversion { target: &'static str, value: String },
}

impl StoreError {
    /// True when the error means "nothing stored there".
    pub fn is_nil(&self) -> bool {
        matches!(self, StoreError::Nil)
    }

    /// Kind of the underlying client error, if any.
    pub fn redis_kind(&self) -> Option<ErrorKind> {
        match self {
            StoreError::Redis(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Error code of a server error reply, such as `ERR` or `WRONGTYPE`.
    pub fn server_code(&self) -> Option<&str> {
        match self {
            StoreError::Redis(err) => err.code(),
            _ => None,
        }
    }
}
