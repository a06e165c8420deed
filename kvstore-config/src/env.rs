//! Typed environment lookups.
//!
//! None of these fail: a value that does not convert is logged at error
//! level and replaced with the zero value of the target type.

use std::time::Duration;

use tracing::error;

use kvstore::parse_bool;

/// Value of `key`, or `""` when unset or not valid unicode.
pub fn get_string(key: &str) -> String {
    Vars::process().string(key)
}

/// Decimal integer value of `key`, or `0`.
pub fn get_int(key: &str) -> i64 {
    Vars::process().int(key)
}

/// Whole seconds in `key`, or zero. Negative values count as a failed conversion.
pub fn get_duration(key: &str) -> Duration {
    Vars::process().duration(key)
}

/// Boolean value of `key` (`1 t T TRUE true True` / `0 f F FALSE false False`), or `false`.
pub fn get_bool(key: &str) -> bool {
    Vars::process().bool(key)
}

/// Variable source behind the `get_*` helpers.
pub(crate) struct Vars<F>(pub(crate) F);

impl Vars<fn(&str) -> Option<String>> {
    pub(crate) fn process() -> Self {
        let lookup: fn(&str) -> Option<String> = |key| std::env::var(key).ok();
        Vars(lookup)
    }
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub(crate) fn string(&self, key: &str) -> String {
        (self.0)(key).unwrap_or_default()
    }

    pub(crate) fn int(&self, key: &str) -> i64 {
        let value = self.string(key);
        match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                error!(key, value = %value, "unable to convert env value to int");
                0
            }
        }
    }

    pub(crate) fn duration(&self, key: &str) -> Duration {
        let seconds = self.int(key);
        match u64::try_from(seconds) {
            Ok(seconds) => Duration::from_secs(seconds),
            Err(_) => {
                error!(key, seconds, "negative duration in env value");
                Duration::ZERO
            }
        }
    }

    pub(crate) fn bool(&self, key: &str) -> bool {
        let value = self.string(key);
        parse_bool(&value).unwrap_or_else(|| {
            error!(key, value = %value, "unable to convert env value to bool");
            false
        })
    }

    /// Like `int` for counts; negative numbers become zero.
    pub(crate) fn count(&self, key: &str) -> usize {
        let value = self.int(key);
        usize::try_from(value).unwrap_or_else(|_| {
            error!(key, value, "negative count in env value");
            0
        })
    }
}

#[cfg(test)]
pub(crate) fn vars_from(pairs: &[(&str, &str)]) -> Vars<impl Fn(&str) -> Option<String>> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Vars(move |key: &str| map.get(key).cloned())
}
