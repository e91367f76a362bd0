//! Object-scoped side-channel headers for in-process hand-off.
//!
//! Object headers carry arbitrary in-memory values (connection handles,
//! parsed documents, upstream acknowledgement callbacks) between stages in
//! the same process. They are never serialised and are dropped when a
//! message is forked; anything that must survive a process or fan-out
//! boundary belongs in the metadata store instead.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// A mapping from string keys to arbitrary in-memory values.
///
/// Unlike metadata, keys are case-sensitive and values are opaque
/// [`Any`] boxes retrieved by downcasting to the expected type.
///
/// # Examples
///
/// ```
/// use dunnage::message::domain::ObjectHeaders;
///
/// let mut headers = ObjectHeaders::new();
/// headers.insert("retry-count", 3_u32);
/// assert_eq!(headers.get::<u32>("retry-count"), Some(&3));
/// assert_eq!(headers.get::<String>("retry-count"), None);
/// ```
#[derive(Default)]
pub struct ObjectHeaders {
    entries: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ObjectHeaders {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value under the given key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Returns the value for a key, downcast to the requested type.
    ///
    /// Returns `None` if the key is absent or the stored value is of a
    /// different type.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|value| value.downcast_ref())
    }

    /// Returns the value for a key as an untyped [`Any`] reference.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.entries.get(key).map(AsRef::as_ref)
    }

    /// Removes and returns the value for a key.
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Any + Send + Sync>> {
        self.entries.remove(key)
    }

    /// Returns `true` if the key is present (matched case-sensitively).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the header keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Values are opaque, so `Debug` output lists keys only.
impl fmt::Debug for ObjectHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
