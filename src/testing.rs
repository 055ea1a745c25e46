//! Testing utilities for combine pipelines.
//!
//! Helpers shared by the crate's own test suite and available to users
//! testing their combiners: terse constructors for tagged values and
//! datasets, plus sorted extraction of outputs for deterministic comparison.
//!
//! ```
//! use keyfold::combiners::sum;
//! use keyfold::testing::{keyed, sorted_pairs};
//! use keyfold::{HashGrouping, per_key};
//!
//! let input = keyed("acme", vec![('a', 1u64), ('b', 2), ('a', 3)]);
//! let out = per_key(sum::<u64>()).expand(input, &HashGrouping).unwrap();
//! assert_eq!(sorted_pairs(out), vec![('a', 4), ('b', 2)]);
//! ```

use crate::dataset::{Dataset, KeyedDataset};
use crate::tenant::{Tagged, TenantId};

/// A value attributed to the given tenant.
pub fn tag<T>(tenant: &str, value: T) -> Tagged<T> {
    Tagged::new(TenantId::new(tenant), value)
}

/// A globally windowed dataset from bare values, all attributed to `tenant`.
pub fn dataset<T>(tenant: &str, values: Vec<T>) -> Dataset<T> {
    Dataset::global(values.into_iter().map(|value| tag(tenant, value)).collect())
}

/// A globally windowed keyed dataset from bare pairs, all attributed to
/// `tenant`.
pub fn keyed<K, V>(tenant: &str, pairs: Vec<(K, V)>) -> KeyedDataset<K, V> {
    KeyedDataset::global(pairs.into_iter().map(|(key, value)| (key, tag(tenant, value))).collect())
}

/// Key/value pairs of a keyed output, attribution dropped, sorted by key.
///
/// Group order out of the engine follows input order, not key order; sorting
/// keeps comparisons deterministic.
pub fn sorted_pairs<K: Ord, V>(output: KeyedDataset<K, V>) -> Vec<(K, V)> {
    let mut pairs: Vec<(K, V)> =
        output.elements.into_iter().map(|element| (element.key, element.value.value)).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Bare values of an unkeyed output, attribution dropped, sorted by window.
pub fn window_values<T>(output: Dataset<T>) -> Vec<T> {
    let mut elements = output.elements;
    elements.sort_by_key(|element| element.window);
    elements.into_iter().map(|element| element.value.value).collect()
}
