//! The `Store` contract.
//!
//! Every method maps to exactly one remote command. Nothing is retried or
//! batched, and remote failures are returned as-is.

use crate::error::StoreResult;
use crate::value::{DataType, ListItem, ListItems, Value};

/// Key/value, hash, set, and list primitives over a remote key-value store.
pub trait Store: Send + Sync {
    /// Removes `key`. Deleting a missing key is not an error.
    fn delete_key(&self, key: &str) -> StoreResult<()>;

    /// Reads a string value. Fails with `Nil` when the key is missing.
    fn get_string(&self, key: &str) -> StoreResult<String>;

    /// Reads a 64-bit integer value. Fails with `Nil` when the key is missing.
    fn get_int64(&self, key: &str) -> StoreResult<i64>;

    fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    fn set_hash(&self, key: &str, field: &str, value: Value) -> StoreResult<()>;

    fn delete_hash(&self, key: &str, field: &str) -> StoreResult<()>;

    /// Reads one hash field. Fails with `Nil` when the field is missing.
    fn get_hash_string(&self, key: &str, field: &str) -> StoreResult<String>;

    /// All field values of a hash, in server order.
    fn get_all_hash_values(&self, key: &str) -> StoreResult<Vec<String>>;

    /// All field names of a hash, in server order.
    fn get_all_hash_keys(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Expires `key` after `seconds`.
    fn set_expiry(&self, key: &str, seconds: i64) -> StoreResult<()>;

    /// Adds one to the integer at `key`, starting from zero.
    fn increment(&self, key: &str) -> StoreResult<()>;

    /// Subtracts one from the integer at `key`, starting from zero.
    fn decrement(&self, key: &str) -> StoreResult<()>;

    fn set_add(&self, key: &str, value: Value) -> StoreResult<()>;

    fn set_remove(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Members of a set; order is unspecified.
    fn set_members(&self, key: &str) -> StoreResult<Vec<String>>;

    fn set_is_member(&self, key: &str, value: Value) -> StoreResult<bool>;

    /// Pushes onto the tail when `at_end`, otherwise onto the head.
    fn push_item_to_list(&self, key: &str, value: Value, at_end: bool) -> StoreResult<()>;

    /// Pops from the tail when `at_end`, otherwise from the head, and decodes
    /// the element as `data_type`.
    ///
    /// The element is removed before decoding, so a decode failure still
    /// consumes it.
    fn pop_item_from_list(&self, key: &str, data_type: DataType, at_end: bool) -> StoreResult<ListItem>;

    /// Elements `start..=end` (negative indexes count from the tail).
    ///
    /// Only `DataType::String` and `DataType::Int` are supported; other tags
    /// fail with `InvalidDataType` before anything is sent.
    fn items_from_list(&self, key: &str, data_type: DataType, start: i64, end: i64) -> StoreResult<ListItems>;

    /// Removes occurrences of `value`: all when `count == 0`, the first
    /// `count` from the head when positive, the last `|count|` when negative.
    fn remove_item_from_list(&self, key: &str, count: i64, value: Value) -> StoreResult<()>;

    fn length_of_list(&self, key: &str) -> StoreResult<usize>;

    /// Removes every key in the current database.
    fn clear_data_store(&self) -> StoreResult<()>;
}
