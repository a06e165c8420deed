//! # kvstore Configuration
//!
//! Purpose: Turn environment variables into typed values and build the
//! handles an application needs: a Redis connection pool (and `RedisStore`)
//! and, with the `mysql` feature, a MySQL pool.
//!
//! ## Notes
//! - Conversion failures never surface as errors. They are logged and the
//!   zero value is used.
//! - Pools are constructed lazily; the first command performs the dial.

pub mod env;
pub mod logging;
pub mod redis;
#[cfg(feature = "mysql")]
pub mod sql;

pub use env::{get_bool, get_duration, get_int, get_string};
pub use logging::init_tracing;
pub use redis::{redis_pool, RedisSettings};
#[cfg(feature = "mysql")]
pub use sql::{sql_database, SqlSettings};
