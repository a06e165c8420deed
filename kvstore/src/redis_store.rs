//! # Redis Store
//!
//! Purpose: Implement [`Store`] on top of a [`RedisPool`].
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `RedisStore` hides pooling and protocol details.
//! 2. **One Command Per Call**: Check out, send, convert, release. No pipelining.
//! 3. **RAII Release**: The pooled connection is dropped at the end of
//!    `command`, so it goes back to the pool even when the reply is an error.

use redis::{FromRedisValue, ToRedisArgs};
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::pool::RedisPool;
use crate::reply;
use crate::store::Store;
use crate::value::{DataType, ListItem, ListItems, Value};

const NO_ARGS: &[&str] = &[];

/// [`Store`] backed by a Redis-compatible server.
#[derive(Debug, Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    /// Creates a store over `pool`. The store keeps a clone of the handle;
    /// connections close once every clone is dropped.
    pub fn new(pool: RedisPool) -> Self {
        RedisStore { pool }
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    fn command<T: FromRedisValue>(&self, name: &str, args: impl ToRedisArgs) -> StoreResult<T> {
        let mut conn = self.pool.get()?;
        trace!(command = name, "issuing command");
        Ok(redis::cmd(name).arg(args).query(&mut *conn)?)
    }
}

impl Store for RedisStore {
    fn delete_key(&self, key: &str) -> StoreResult<()> {
        self.command("DEL", key)
    }

    fn get_string(&self, key: &str) -> StoreResult<String> {
        reply::present(self.command("GET", key)?)
    }

    fn get_int64(&self, key: &str) -> StoreResult<i64> {
        reply::present(self.command("GET", key)?)
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.command("SET", (key, value))
    }

    fn set_hash(&self, key: &str, field: &str, value: Value) -> StoreResult<()> {
        self.command("HSET", (key, field, value))
    }

    fn delete_hash(&self, key: &str, field: &str) -> StoreResult<()> {
        self.command("HDEL", (key, field))
    }

    fn get_hash_string(&self, key: &str, field: &str) -> StoreResult<String> {
        reply::present(self.command("HGET", (key, field))?)
    }

    fn get_all_hash_values(&self, key: &str) -> StoreResult<Vec<String>> {
        Ok(reply::strings(self.command("HVALS", key)?))
    }

    fn get_all_hash_keys(&self, key: &str) -> StoreResult<Vec<String>> {
        Ok(reply::strings(self.command("HKEYS", key)?))
    }

    fn set_expiry(&self, key: &str, seconds: i64) -> StoreResult<()> {
        self.command("EXPIRE", (key, seconds))
    }

    fn increment(&self, key: &str) -> StoreResult<()> {
        self.command("INCR", key)
    }

    fn decrement(&self, key: &str) -> StoreResult<()> {
        self.command("DECR", key)
    }

    fn set_add(&self, key: &str, value: Value) -> StoreResult<()> {
        self.command("SADD", (key, value))
    }

    fn set_remove(&self, key: &str, value: Value) -> StoreResult<()> {
        self.command("SREM", (key, value))
    }

    fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        Ok(reply::strings(self.command("SMEMBERS", key)?))
    }

    fn set_is_member(&self, key: &str, value: Value) -> StoreResult<bool> {
        self.command("SISMEMBER", (key, value))
    }

    fn push_item_to_list(&self, key: &str, value: Value, at_end: bool) -> StoreResult<()> {
        let name = if at_end { "RPUSH" } else { "LPUSH" };
        self.command(name, (key, value))
    }

    fn pop_item_from_list(&self, key: &str, data_type: DataType, at_end: bool) -> StoreResult<ListItem> {
        let name = if at_end { "RPOP" } else { "LPOP" };
        let popped: redis::Value = self.command(name, key)?;

        match data_type {
            DataType::String => reply::present(redis::from_redis_value(&popped)?).map(ListItem::String),
            DataType::Bool => reply::boolean(redis::from_redis_value(&popped)?).map(ListItem::Bool),
            DataType::Int => reply::present(redis::from_redis_value(&popped)?).map(ListItem::Int),
            DataType::Int64 => reply::present(redis::from_redis_value(&popped)?).map(ListItem::Int64),
        }
    }

    fn items_from_list(&self, key: &str, data_type: DataType, start: i64, end: i64) -> StoreResult<ListItems> {
        match data_type {
            DataType::String => {
                let items = self.command("LRANGE", (key, start, end))?;
                Ok(ListItems::Strings(reply::strings(items)))
            }
            DataType::Int => Ok(ListItems::Ints(self.command("LRANGE", (key, start, end))?)),
            DataType::Bool | DataType::Int64 => Err(StoreError::InvalidDataType),
        }
    }

    fn remove_item_from_list(&self, key: &str, count: i64, value: Value) -> StoreResult<()> {
        self.command("LREM", (key, count, value))
    }

    fn length_of_list(&self, key: &str) -> StoreResult<usize> {
        self.command("LLEN", key)
    }

    fn clear_data_store(&self) -> StoreResult<()> {
        self.command("FLUSHDB", NO_ARGS)
    }
}
