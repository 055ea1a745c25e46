//! In-memory representations of the record streams this engine consumes and
//! produces.
//!
//! The surrounding pipeline owns the real distributed collections; the
//! combine core sees them only as bundles of windowed, tenant-tagged
//! elements plus the [`WindowingStrategy`] slice it is allowed to read.

use crate::tenant::Tagged;
use crate::window::{Window, WindowingStrategy};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Bound for every value the engine transports: owned, shareable across the
/// reduction fan, and serializable for engine-internal channels.
pub trait Elem: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}
impl<T> Elem for T where T: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}

/// Bound for grouping keys.
pub trait Key: Elem + Eq + std::hash::Hash {}
impl<T> Key for T where T: Elem + Eq + std::hash::Hash {}

/// One element of an unkeyed dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowedValue<T> {
    pub window: Window,
    pub value: Tagged<T>,
}

/// One element of a keyed dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyedValue<K, V> {
    pub window: Window,
    pub key: K,
    pub value: Tagged<V>,
}

/// All values of one key in one window, as handed over by the grouping
/// collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueGroup<K, V> {
    pub window: Window,
    pub key: K,
    pub values: Vec<Tagged<V>>,
}

/// An unkeyed bundle of windowed elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset<T> {
    pub strategy: WindowingStrategy,
    pub elements: Vec<WindowedValue<T>>,
}

impl<T> Dataset<T> {
    /// A globally windowed dataset from tagged values.
    pub fn global(values: Vec<Tagged<T>>) -> Self {
        Self {
            strategy: WindowingStrategy::global(),
            elements: values
                .into_iter()
                .map(|value| WindowedValue { window: Window::global(), value })
                .collect(),
        }
    }
}

/// A keyed bundle of windowed elements.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyedDataset<K, V> {
    pub strategy: WindowingStrategy,
    pub elements: Vec<KeyedValue<K, V>>,
}

impl<K, V> KeyedDataset<K, V> {
    /// A globally windowed keyed dataset from tagged key/value pairs.
    pub fn global(pairs: Vec<(K, Tagged<V>)>) -> Self {
        Self {
            strategy: WindowingStrategy::global(),
            elements: pairs
                .into_iter()
                .map(|(key, value)| KeyedValue { window: Window::global(), key, value })
                .collect(),
        }
    }
}

/// A keyed dataset after group-by-key: one [`ValueGroup`] per (window, key).
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedDataset<K, V> {
    pub strategy: WindowingStrategy,
    pub groups: Vec<ValueGroup<K, V>>,
}
