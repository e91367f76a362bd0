//! Case-insensitive, insertion-ordered metadata for message envelopes.
//!
//! Keys are matched case-insensitively but displayed with the casing they
//! were first inserted with. The store is a normalised-key index (lowercased
//! key to entry position) layered over an insertion-ordered sequence, so
//! lookups are constant-time while iteration order stays stable.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// An ordered collection of key/value string pairs with case-insensitive
/// key uniqueness.
///
/// # Invariants
///
/// - No two keys differ only in ASCII case
/// - Iteration yields entries in first-insertion order
/// - Re-adding an existing key overwrites its value in place without
///   changing its position or its stored casing
///
/// # Examples
///
/// ```
/// use dunnage::message::domain::MetadataStore;
///
/// let mut store = MetadataStore::new();
/// store.add("Content-Type", "text/plain");
/// assert_eq!(store.get("content-type"), Some("text/plain"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    /// Entries in first-insertion order.
    entries: Vec<MetadataEntry>,
    /// Lowercased key to position in `entries`.
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
struct MetadataEntry {
    /// Key with the casing it was first inserted with.
    key: String,
    value: String,
}

impl MetadataStore {
    /// Creates an empty metadata store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key/value pair, overwriting the value in place if a
    /// case-variant of the key is already present.
    ///
    /// The first-inserted casing of the key and its position in iteration
    /// order are preserved across overwrites.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let normalized = key.to_ascii_lowercase();
        if let Some(&position) = self.index.get(&normalized) {
            if let Some(entry) = self.entries.get_mut(position) {
                entry.value = value.into();
            }
        } else {
            self.index.insert(normalized, self.entries.len());
            self.entries.push(MetadataEntry {
                key,
                value: value.into(),
            });
        }
    }

    /// Returns the value for a key, matched case-insensitively.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let normalized = key.to_ascii_lowercase();
        self.index
            .get(&normalized)
            .and_then(|&position| self.entries.get(position))
            .map(|entry| entry.value.as_str())
    }

    /// Removes a key, matched case-insensitively, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let normalized = key.to_ascii_lowercase();
        let position = self.index.remove(&normalized)?;
        let entry = self.entries.remove(position);
        // Positions after the removed entry shift down by one.
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(entry.value)
    }

    /// Returns `true` if a case-variant of the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&key.to_ascii_lowercase())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Returns the keys in first-insertion order, each with the casing it
    /// was first inserted with.
    ///
    /// The iterator is lazy and finite; call again to restart.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Returns the `(key, value)` pairs in first-insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    /// Merges another store into this one.
    ///
    /// Entries from `other` overwrite on key collision (in place, keeping
    /// this store's position and casing); new keys append in `other`'s
    /// iteration order.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in other.entries() {
            self.add(key, value);
        }
    }
}

/// Equality compares the case-insensitive key set and the associated
/// values; insertion order is not part of equality.
impl PartialEq for MetadataStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for MetadataStore {}

impl<K, V> FromIterator<(K, V)> for MetadataStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.add(key, value);
        }
        store
    }
}

/// Serialises as a map in first-insertion order with first-inserted key
/// casing, so round trips preserve the observable entry order.
impl Serialize for MetadataStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.entries() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MetadataStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = MetadataStore;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of metadata keys to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut store = MetadataStore::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    store.add(key, value);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}
