//! The group-by-key collaborator interface.
//!
//! Grouping is owned by the surrounding pipeline; the combine core only
//! needs "all values of one key in one window, together". [`HashGrouping`]
//! is the crate's in-memory implementation, used as the default collaborator
//! and by the test suite.

use crate::dataset::{Elem, GroupedDataset, Key, KeyedDataset, ValueGroup};
use crate::window::Window;
use std::collections::HashMap;

/// Opaque low-cardinality hint, forwarded to the grouping collaborator and
/// never interpreted by the combine core.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum KeyHint {
    #[default]
    Normal,
    /// The caller expects few distinct keys.
    FewKeys,
}

/// Group-by-key service: collect each key's values per window.
pub trait Grouping: Send + Sync {
    fn group_by_key<K: Key, V: Elem>(
        &self,
        input: KeyedDataset<K, V>,
        hint: KeyHint,
    ) -> GroupedDataset<K, V>;
}

/// In-memory hash grouping. Groups appear in first-seen order of their
/// (window, key), which keeps single-threaded runs deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashGrouping;

impl Grouping for HashGrouping {
    fn group_by_key<K: Key, V: Elem>(
        &self,
        input: KeyedDataset<K, V>,
        _hint: KeyHint,
    ) -> GroupedDataset<K, V> {
        let mut index: HashMap<(Window, K), usize> = HashMap::new();
        let mut groups: Vec<ValueGroup<K, V>> = Vec::new();
        for element in input.elements {
            let slot = *index.entry((element.window, element.key.clone())).or_insert_with(|| {
                groups.push(ValueGroup {
                    window: element.window,
                    key: element.key.clone(),
                    values: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].values.push(element.value);
        }
        GroupedDataset { strategy: input.strategy, groups }
    }
}
