use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::utils::CCStr;

/// Stable identity of an [Entry] inside a keyed collection.
///
/// Two keys are the same identity when their string forms are equal, so
/// `Key::Int(7)` and `Key::Str("7")` designate the same entry. Hosts mixing
/// both kinds in one collection must keep this in mind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Str(CCStr),
}

impl Key {
    /// The string form used for identity comparison.
    pub fn id(&self) -> CCStr {
        match self {
            Key::Str(s) => s.clone(),
            Key::Int(i) => CCStr::from(i.to_string()),
        }
    }
}

impl core::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Str(s) => s.fmt(f),
            Key::Int(i) => i.fmt(f),
        }
    }
}

impl From<CCStr> for Key {
    fn from(value: CCStr) -> Self {
        Key::Str(value)
    }
}
impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.into())
    }
}
impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value.into())
    }
}

macro_rules! key_from_integer {
    ($t:ty) => {
        impl From<$t> for Key {
            fn from(value: $t) -> Self {
                Key::Int(value as i64)
            }
        }
    };
}
key_from_integer!(i8);
key_from_integer!(u8);
key_from_integer!(i16);
key_from_integer!(u16);
key_from_integer!(i32);
key_from_integer!(u32);
key_from_integer!(i64);

/// A keyed value. Order of entries inside a sequence is rendering order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    pub key: Key,
    pub value: V,
}

impl<V> Entry<V> {
    pub fn new(key: impl Into<Key>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl<K: Into<Key>, V> From<(K, V)> for Entry<V> {
    fn from((key, value): (K, V)) -> Self {
        Entry::new(key, value)
    }
}

/// Collect the identity set of a sequence of entries.
pub(crate) fn key_ids<V>(entries: &[Entry<V>]) -> HashSet<CCStr> {
    entries.iter().map(|e| e.key.id()).collect()
}

/// Errors reported about the shape of an entry sequence
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("duplicate key {key:?} at indexes {first} and {second}")]
    DuplicateKey {
        key: CCStr,
        first: usize,
        second: usize,
    },
}

/// Verify that no two entries share a key identity.
///
/// The reconciliation algorithm assumes unique keys; on duplicates its
/// behavior follows iteration order and is otherwise unspecified.
pub fn check_unique_keys<V>(entries: &[Entry<V>]) -> Result<(), SyncError> {
    let mut seen: HashMap<CCStr, usize> = HashMap::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let id = entry.key.id();
        if let Some(first) = seen.get(&id) {
            return Err(SyncError::DuplicateKey {
                key: id,
                first: *first,
                second: index,
            });
        }
        seen.insert(id, index);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_string_keys_share_identity() {
        assert_eq!(Key::from(42).id(), Key::from("42").id());
        assert_ne!(Key::from(42), Key::from("42"));
    }

    #[test]
    fn duplicates_are_reported_with_both_positions() {
        let entries: Vec<Entry<u8>> = vec![("a", 1).into(), (1, 2).into(), ("1", 3).into()];
        assert_eq!(
            check_unique_keys(&entries),
            Err(SyncError::DuplicateKey {
                key: "1".into(),
                first: 1,
                second: 2
            })
        );
        assert!(check_unique_keys(&entries[..2]).is_ok());
    }

    #[test]
    fn keys_deserialize_untagged() {
        let entries: Vec<Entry<bool>> =
            serde_json::from_str(r#"[{"key":"a","value":true},{"key":3,"value":false}]"#).unwrap();
        assert_eq!(entries[0].key, Key::from("a"));
        assert_eq!(entries[1].key, Key::Int(3));
    }
}
