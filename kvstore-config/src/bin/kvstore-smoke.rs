//! # Store Smoke Check
//!
//! Purpose: Exercise a live server with the settings from `REDIS_*`
//! environment variables, so deployments can verify connectivity and auth.
//!
//! Usage: `kvstore-smoke [key-prefix]` (default prefix `kvstore-smoke`).
//! Only keys under the prefix are touched; they are deleted afterwards,
//! also when a step fails.

use std::env;

use anyhow::{ensure, Context, Result};
use tracing::{info, warn};

use kvstore::{DataType, Store};
use kvstore_config::{init_tracing, RedisSettings};

fn main() -> Result<()> {
    init_tracing();

    let prefix = env::args().nth(1).unwrap_or_else(|| "kvstore-smoke".to_string());
    let settings = RedisSettings::from_env();
    ensure!(!settings.host.is_empty(), "REDIS_HOST is not set");

    let store = settings.store().context("invalid REDIS_* settings")?;
    run(&store, &prefix)?;

    info!(host = %settings.host, port = %settings.port, "smoke check passed");
    Ok(())
}

struct Keys {
    string: String,
    counter: String,
    list: String,
}

impl Keys {
    fn new(prefix: &str) -> Self {
        Keys {
            string: format!("{prefix}:string"),
            counter: format!("{prefix}:counter"),
            list: format!("{prefix}:list"),
        }
    }

    fn all(&self) -> [&str; 3] {
        [self.string.as_str(), self.counter.as_str(), self.list.as_str()]
    }
}

fn run(store: &dyn Store, prefix: &str) -> Result<()> {
    let keys = Keys::new(prefix);
    let result = exercise(store, &keys);
    let cleaned = cleanup(store, &keys);
    result.and(cleaned)
}

fn exercise(store: &dyn Store, keys: &Keys) -> Result<()> {
    store.set(&keys.string, "ok".into()).context("SET")?;
    let value = store.get_string(&keys.string).context("GET")?;
    ensure!(value == "ok", "read back {value:?}");

    store.increment(&keys.counter).context("INCR")?;
    store.increment(&keys.counter).context("INCR")?;
    store.decrement(&keys.counter).context("DECR")?;
    let counter = store.get_int64(&keys.counter).context("GET counter")?;
    ensure!(counter == 1, "counter is {counter}");

    for item in ["a", "b", "c"] {
        store.push_item_to_list(&keys.list, item.into(), true).context("RPUSH")?;
    }
    let len = store.length_of_list(&keys.list).context("LLEN")?;
    let head = store.pop_item_from_list(&keys.list, DataType::String, false).context("LPOP")?;
    let rest = store.items_from_list(&keys.list, DataType::String, 0, 1).context("LRANGE")?;
    info!(len, head = ?head, rest = ?rest, "list round trip");

    Ok(())
}

/// Deletes every key, even after an earlier failure; reports the first error.
fn cleanup(store: &dyn Store, keys: &Keys) -> Result<()> {
    let mut first_error = None;
    for key in keys.all() {
        if let Err(err) = store.delete_key(key) {
            warn!(key, error = %err, "unable to delete smoke key");
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err).context("DEL"),
        None => Ok(()),
    }
}
