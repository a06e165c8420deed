//! Redis pool construction from explicit parameters or the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::error;

use kvstore::{build_pool, PoolConfig, RedisPool, RedisStore};

use crate::env::Vars;

pub const REDIS_MAX_IDLE: &str = "REDIS_MAX_IDLE";
pub const REDIS_IDLE_TIMEOUT: &str = "REDIS_IDLE_TIMEOUT";
pub const REDIS_HOST: &str = "REDIS_HOST";
pub const REDIS_PORT: &str = "REDIS_PORT";
pub const REDIS_PASSWORD: &str = "REDIS_PASSWORD";

/// Builds a pool dialing `host:port`, sending `AUTH password` on each new
/// connection when `password` is non-empty.
///
/// Nothing is dialed here; connection errors show up on first use. A zero
/// `idle_timeout` keeps idle connections forever and a zero `max_idle`
/// selects [`kvstore::DEFAULT_MAX_CONNECTIONS`]. Returns `None` (after
/// logging) when `port` is not a TCP port number.
pub fn redis_pool(
    max_idle: usize,
    idle_timeout: Duration,
    host: &str,
    port: &str,
    password: &str,
) -> Option<RedisPool> {
    let config = pool_config(max_idle, idle_timeout, host, port, password)?;
    match build_pool(&config) {
        Ok(pool) => Some(pool),
        Err(err) => {
            error!(host, port, error = %err, "unable to build redis pool");
            None
        }
    }
}

fn pool_config(
    max_idle: usize,
    idle_timeout: Duration,
    host: &str,
    port: &str,
    password: &str,
) -> Option<PoolConfig> {
    let Ok(port) = port.parse() else {
        error!(host, port, "unable to build redis pool: invalid port");
        return None;
    };

    Some(PoolConfig {
        host: host.to_string(),
        port,
        password: (!password.is_empty()).then(|| password.to_string()),
        max_idle: u32::try_from(max_idle).unwrap_or(u32::MAX),
        idle_timeout: (!idle_timeout.is_zero()).then_some(idle_timeout),
        ..PoolConfig::default()
    })
}

/// Pool parameters, usually read with [`RedisSettings::from_env`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default)]
    pub max_idle: usize,
    /// Seconds; zero disables the idle timeout.
    #[serde(default)]
    pub idle_timeout_secs: u64,
    pub host: String,
    pub port: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl RedisSettings {
    /// Reads `REDIS_MAX_IDLE`, `REDIS_IDLE_TIMEOUT`, `REDIS_HOST`, `REDIS_PORT`
    /// and `REDIS_PASSWORD`, falling back to zero values.
    pub fn from_env() -> Self {
        Self::from_vars(&Vars::process())
    }

    pub(crate) fn from_vars<F>(vars: &Vars<F>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        RedisSettings {
            max_idle: vars.count(REDIS_MAX_IDLE),
            idle_timeout_secs: vars.duration(REDIS_IDLE_TIMEOUT).as_secs(),
            host: vars.string(REDIS_HOST),
            port: vars.string(REDIS_PORT),
            password: vars.string(REDIS_PASSWORD),
        }
    }

    pub fn pool(&self) -> Option<RedisPool> {
        redis_pool(
            self.max_idle,
            Duration::from_secs(self.idle_timeout_secs),
            &self.host,
            &self.port,
            &self.password,
        )
    }

    /// Store over a fresh pool built from these settings.
    pub fn store(&self) -> Option<RedisStore> {
        self.pool().map(RedisStore::new)
    }
}
