use crate::common::Value;
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::path::FieldPath;
use im::OrdMap;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

/// The field data of a document: an ordered map from field name to [Value].
///
/// Nested objects are stored as [Value::Map] and can be reached with a
/// [FieldPath], e.g. `data.get_path(&"address.city".into())`.
///
/// ## Persistent storage
///
/// Backed by `im::OrdMap`, so cloning is O(1) and a clone shares structure
/// with the original until either side is modified. Snapshots, transaction
/// surrogates and write batches all rely on cheap clones.
#[derive(Clone, Eq, PartialEq, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DocumentData {
    data: OrdMap<String, Value>,
}

impl DocumentData {
    pub fn new() -> Self {
        DocumentData {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Inserts a top-level field as is; dots in `key` are not interpreted.
    pub fn insert<T: Into<Value>>(&mut self, key: &str, value: T) {
        self.data.insert(key.to_string(), value.into());
    }

    /// Builder form of [insert](DocumentData::insert).
    pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Gets a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets a nested field. Returns `None` when any segment is missing or a
    /// non-map value sits in the middle of the path.
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.data.get(first)?;
        for segment in rest {
            match current {
                Value::Map(nested) => current = nested.data.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Sets a nested field, creating intermediate maps as needed. An existing
    /// non-map value on the way is replaced by a map.
    pub fn put_path<T: Into<Value>>(&mut self, path: &FieldPath, value: T) -> FirestoreResult<()> {
        self.deep_put(path.segments(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Deep-merges `other` into this document: nested maps are merged
    /// recursively, every other value replaces the existing one. A top-level
    /// key holding a dotted path (`"a.b"`) sets only that nested field.
    pub fn merge(&mut self, other: &DocumentData) -> FirestoreResult<()> {
        for (key, value) in other.data.iter() {
            if key.contains('.') {
                self.put_path(&FieldPath::from_dotted(key), value.clone())?;
            } else {
                self.merge_field(key, value);
            }
        }
        Ok(())
    }

    /// Applies an update map whose keys are dotted field paths. Every key
    /// replaces the value at its nested location and leaves siblings intact.
    pub fn apply_update(&mut self, update: &DocumentData) -> FirestoreResult<()> {
        for (key, value) in update.data.iter() {
            self.put_path(&FieldPath::from_dotted(key), value.clone())?;
        }
        Ok(())
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn merge_field(&mut self, key: &str, value: &Value) {
        match (value, self.data.get(key)) {
            (Value::Map(incoming), Some(Value::Map(existing))) => {
                let mut merged = existing.clone();
                for (nested_key, nested_value) in incoming.data.iter() {
                    merged.merge_field(nested_key, nested_value);
                }
                self.data.insert(key.to_string(), Value::Map(merged));
            }
            _ => {
                self.data.insert(key.to_string(), value.clone());
            }
        }
    }

    fn deep_put(&mut self, splits: &[String], value: Value) -> FirestoreResult<()> {
        let Some((key, remaining)) = splits.split_first() else {
            return Err(raise("Empty field path", ErrorKind::InvalidArgument));
        };

        if key.is_empty() {
            return Err(raise(
                "Field paths must not contain empty segments",
                ErrorKind::InvalidArgument,
            ));
        }

        if remaining.is_empty() {
            self.data.insert(key.clone(), value);
            return Ok(());
        }

        let mut nested = match self.data.get(key) {
            Some(Value::Map(existing)) => existing.clone(),
            _ => DocumentData::new(),
        };
        nested.deep_put(remaining, value)?;
        self.data.insert(key.clone(), Value::Map(nested));
        Ok(())
    }
}

impl Display for DocumentData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.data.iter().map(|(k, v)| format!("\"{}\":{}", k, v)).join(",")
        )
    }
}

impl Debug for DocumentData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromIterator<(String, Value)> for DocumentData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        DocumentData {
            data: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, Value>> for DocumentData {
    fn from(value: BTreeMap<String, Value>) -> Self {
        value.into_iter().collect()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates [DocumentData] with JSON-like syntax.
///
/// Keys are inserted verbatim, so `"a.b"` is a single top-level key; that is
/// the shape `update` expects for dotted field paths.
///
/// ```rust
/// use firestore_mock::doc;
///
/// let data = doc! {
///     name: "Alice",
///     score: (40 + 2),
///     address: { city: "Paris", zip: "75001" },
///     tags: ["a", "b"],
///     "nested.key": true,
/// };
/// assert_eq!(data.len(), 5);
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::DocumentData::new()
    };

    () => {
        $crate::collection::DocumentData::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut data = $crate::collection::DocumentData::new();
            $(
                data.insert(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            data
        }
    };
}

/// Helper macro converting the values of [doc!].
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Map($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
