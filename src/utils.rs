use std::borrow::Borrow;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};

/// Loaded-or-not result where failures are carried as cheap strings.
///
/// `None` means "not loaded yet". Hosts whose producers can fail use this as
/// the scheduler value type, since the scheduler itself has no error state.
pub type LResult<T> = Option<Result<T, CCStr>>;

pub fn log_error_ccstr<E: core::fmt::Display>(error: E) -> CCStr {
    let e = error.to_string();
    log::error!("{e}");
    CCStr::from(e)
}

pub async fn async_sleep(timeout_ms: u64) {
    tokio::time::sleep(tokio::time::Duration::from_millis(timeout_ms)).await
}

/// Initialize `env_logger` with `default_filter` unless `RUST_LOG` says otherwise.
///
/// Safe to call more than once, later calls are ignored.
pub fn init_logger(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_micros()
        .try_init();
}

pub type CheapClone<T> = std::rc::Rc<T>;

/// Reference counted immutable string, cheap to clone.
///
/// Used as the identity form of [Key](crate::synchronizer::Key)s.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CCStr(CheapClone<str>);
impl Clone for CCStr {
    fn clone(&self) -> Self {
        Self(CheapClone::clone(&self.0))
    }
}

impl Serialize for CCStr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_ref())
    }
}

impl<'de> Deserialize<'de> for CCStr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(|s| CCStr(CheapClone::from(s)))
    }
}

impl core::str::FromStr for CCStr {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CCStr(CheapClone::from(s)))
    }
}
impl From<String> for CCStr {
    fn from(value: String) -> Self {
        CCStr(CheapClone::from(value))
    }
}
impl From<&String> for CCStr {
    fn from(value: &String) -> Self {
        CCStr(CheapClone::from(value.as_str()))
    }
}
impl From<&str> for CCStr {
    fn from(value: &str) -> Self {
        CCStr(CheapClone::from(value))
    }
}
impl core::ops::Deref for CCStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
impl AsRef<str> for CCStr {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl core::fmt::Display for CCStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for CCStr {
    fn borrow(&self) -> &str {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccstr_clones_share_storage() {
        let a = CCStr::from("alpha");
        let b = a.clone();
        assert!(CheapClone::ptr_eq(&a.0, &b.0));
        assert_eq!(&*b, "alpha");
    }

    #[test]
    fn ccstr_borrows_as_str_for_set_lookups() {
        let set: std::collections::HashSet<CCStr> =
            ["a", "b"].into_iter().map(CCStr::from).collect();
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }

    #[test]
    fn log_error_ccstr_keeps_message() {
        let e = log_error_ccstr(std::fmt::Error);
        assert_eq!(&*e, std::fmt::Error.to_string());
    }
}
