//! Reply conversions that `FromRedisValue` does not cover on its own.
//!
//! Missing values are errors rather than `None`, nil elements inside a
//! string array read as empty strings, and stored flags accept the lenient
//! boolean grammar of [`parse_bool`].

use crate::error::{StoreError, StoreResult};

/// Turns a nil reply into [`StoreError::Nil`].
pub(crate) fn present<T>(reply: Option<T>) -> StoreResult<T> {
    reply.ok_or(StoreError::Nil)
}

pub(crate) fn strings(reply: Vec<Option<String>>) -> Vec<String> {
    reply.into_iter().map(Option::unwrap_or_default).collect()
}

pub(crate) fn boolean(reply: Option<String>) -> StoreResult<bool> {
    let text = present(reply)?;
    parse_bool(&text).ok_or(StoreError::Conversion {
        target: "bool",
        value: text,
    })
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
