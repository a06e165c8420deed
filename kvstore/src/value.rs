//! # Values and Decode Tags
//!
//! Arguments go to the server as bulk strings through [`ToRedisArgs`];
//! replies are converted according to a caller-chosen [`DataType`].
//!
//! ## Encoding
//! - strings and bytes are sent verbatim
//! - integers and floats in decimal
//! - booleans as `1` / `0`, which the `Bool` decode tag reads back

use std::borrow::Cow;
use std::fmt;

use redis::{RedisWrite, ToRedisArgs};

use crate::error::StoreError;

/// A value written to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i32),
    Int64(i64),
    Float(f64),
}

impl Value {
    /// Wire form of the value.
    pub fn to_arg(&self) -> Cow<'_, [u8]> {
        match self {
            Value::Str(s) => Cow::Borrowed(s.as_bytes()),
            Value::Bytes(b) => Cow::Borrowed(b),
            Value::Bool(true) => Cow::Borrowed(b"1"),
            Value::Bool(false) => Cow::Borrowed(b"0"),
            Value::Int(i) => Cow::Owned(i.to_string().into_bytes()),
            Value::Int64(i) => Cow::Owned(i.to_string().into_bytes()),
            Value::Float(f) => Cow::Owned(f.to_string().into_bytes()),
        }
    }
}

impl ToRedisArgs for Value {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        out.write_arg(&self.to_arg());
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int64(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// How a list reply is decoded.
///
/// The numeric tags are stable so they can travel through configuration or
/// other untyped channels; see the `TryFrom<i32>` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DataType {
    String = 0,
    Bool = 1,
    Int = 2,
    Int64 = 3,
}

impl TryFrom<i32> for DataType {
    type Error = StoreError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(DataType::String),
            1 => Ok(DataType::Bool),
            2 => Ok(DataType::Int),
            3 => Ok(DataType::Int64),
            _ => Err(StoreError::InvalidDataType),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::Int64 => "int64",
        };
        f.write_str(name)
    }
}

/// A single element popped from a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    String(String),
    Bool(bool),
    Int(i32),
    Int64(i64),
}

impl ListItem {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ListItem::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ListItem::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ListItem::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ListItem::Int64(i) => Some(*i),
            _ => None,
        }
    }
}

/// A range of list elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItems {
    Strings(Vec<String>),
    Ints(Vec<i32>),
}

impl ListItems {
    pub fn len(&self) -> usize {
        match self {
            ListItems::Strings(items) => items.len(),
            ListItems::Ints(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_strings(self) -> Option<Vec<String>> {
        match self {
            ListItems::Strings(items) => Some(items),
            ListItems::Ints(_) => None,
        }
    }

    pub fn into_ints(self) -> Option<Vec<i32>> {
        match self {
            ListItems::Ints(items) => Some(items),
            ListItems::Strings(_) => None,
        }
    }
}
