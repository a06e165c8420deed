//! # Connection Pool
//!
//! Purpose: Build the shared [`RedisPool`] that [`crate::RedisStore`] draws
//! its connections from.
//!
//! ## Behaviour
//! - Connections are dialed lazily, on the first checkout that finds no idle
//!   one; building the pool never touches the network.
//! - `AUTH` is sent by the client on every new connection when a password is
//!   configured.
//! - Checkout does not ping; a connection is dropped instead of returned
//!   once the client has seen it break.
//! - Dropping the last clone of the pool closes its connections.

use std::time::Duration;

use r2d2::HandleError;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError};
use tracing::{debug, error};

use crate::error::StoreResult;

/// Pool of blocking connections to one Redis-compatible server.
pub type RedisPool = r2d2::Pool<redis::Client>;

/// Pool size used when `max_idle` is zero.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameters for [`build_pool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub host: String,
    pub port: u16,
    /// Sent with `AUTH` when set.
    pub password: Option<String>,
    /// Upper bound on pooled connections; zero selects [`DEFAULT_MAX_CONNECTIONS`].
    pub max_idle: u32,
    /// Idle connections older than this are closed. `None` keeps them.
    pub idle_timeout: Option<Duration>,
    /// How long a call waits for a connection before failing.
    pub connection_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            max_idle: 0,
            idle_timeout: None,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

impl PoolConfig {
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                password: self.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }

    fn max_size(&self) -> u32 {
        if self.max_idle == 0 {
            DEFAULT_MAX_CONNECTIONS
        } else {
            self.max_idle
        }
    }
}

/// Builds a pool for `config` without opening any connection.
pub fn build_pool(config: &PoolConfig) -> StoreResult<RedisPool> {
    let client = redis::Client::open(config.connection_info())?;
    let connection_timeout = if config.connection_timeout.is_zero() {
        DEFAULT_CONNECTION_TIMEOUT
    } else {
        config.connection_timeout
    };

    debug!(
        host = %config.host,
        port = config.port,
        max_size = config.max_size(),
        auth = config.password.is_some(),
        "configured redis pool"
    );

    Ok(r2d2::Pool::builder()
        .max_size(config.max_size())
        .min_idle(Some(0))
        .idle_timeout(config.idle_timeout.filter(|timeout| !timeout.is_zero()))
        .connection_timeout(connection_timeout)
        .test_on_check_out(false)
        .error_handler(Box::new(LogDialErrors))
        .build_unchecked(client))
}

/// Reports dial and `AUTH` failures through `tracing`.
#[derive(Debug)]
struct LogDialErrors;

impl HandleError<RedisError> for LogDialErrors {
    fn handle_error(&self, err: RedisError) {
        error!(error = %err, "unable to open redis connection");
    }
}
