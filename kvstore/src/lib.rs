//! # kvstore
//!
//! Purpose: Expose strings, hashes, sets, lists, expiry and counters of a
//! Redis-compatible server through the [`Store`] trait.
//!
//! ## Usage
//!
//! ```no_run
//! use kvstore::{build_pool, DataType, PoolConfig, RedisStore, Store};
//!
//! let pool = build_pool(&PoolConfig::default())?;
//! let store = RedisStore::new(pool);
//!
//! store.push_item_to_list("jobs", "a".into(), true)?;
//! let next = store.pop_item_from_list("jobs", DataType::String, false)?;
//! assert_eq!(next.as_str(), Some("a"));
//! # Ok::<(), kvstore::StoreError>(())
//! ```

mod error;
mod pool;
mod redis_store;
mod reply;
mod store;
mod value;

pub use error::{StoreError, StoreResult};
pub use pool::{build_pool, PoolConfig, RedisPool, DEFAULT_MAX_CONNECTIONS};
pub use redis_store::RedisStore;
pub use reply::parse_bool;
pub use store::Store;
pub use value::{DataType, ListItem, ListItems, Value};
