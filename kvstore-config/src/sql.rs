//! MySQL handle construction.

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use tracing::{debug, error};

use crate::env::Vars;

pub const MYSQL_USER: &str = "MYSQL_USER";
pub const MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";
pub const MYSQL_HOST: &str = "MYSQL_HOST";
pub const MYSQL_PORT: &str = "MYSQL_PORT";
pub const MYSQL_DATABASE: &str = "MYSQL_DATABASE";

/// Returns a lazily connecting pool for `user:password@host:port/database`,
/// or `None` (after logging) when the parameters are unusable.
///
/// Must be called from within a Tokio runtime; outside one this logs and
/// returns `None`.
pub fn sql_database(user: &str, password: &str, host: &str, port: &str, database: &str) -> Option<MySqlPool> {
    let port: u16 = match port.parse() {
        Ok(port) => port,
        Err(_) => {
            error!(host, port, "unable to get sql connection: invalid port");
            return None;
        }
    };

    if tokio::runtime::Handle::try_current().is_err() {
        error!(host, port, "unable to get sql connection: no tokio runtime");
        return None;
    }

    let options = MySqlConnectOptions::new()
        .host(host)
        .port(port)
        .username(user)
        .password(password)
        .database(database);

    debug!(host, port, database, "configured mysql pool");
    Some(MySqlPoolOptions::new().connect_lazy_with(options))
}

/// Connection parameters for [`sql_database`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub database: String,
}

impl SqlSettings {
    /// Reads `MYSQL_USER`, `MYSQL_PASSWORD`, `MYSQL_HOST`, `MYSQL_PORT` and `MYSQL_DATABASE`.
    pub fn from_env() -> Self {
        Self::from_vars(&Vars::process())
    }

    pub(crate) fn from_vars<F>(vars: &Vars<F>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        SqlSettings {
            user: vars.string(MYSQL_USER),
            password: vars.string(MYSQL_PASSWORD),
            host: vars.string(MYSQL_HOST),
            port: vars.string(MYSQL_PORT),
            database: vars.string(MYSQL_DATABASE),
        }
    }

    pub fn database(&self) -> Option<MySqlPool> {
        sql_database(&self.user, &self.password, &self.host, &self.port, &self.database)
    }
}
