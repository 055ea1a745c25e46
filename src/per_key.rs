//! Per-key combining: group by key and window, then reduce each group.

use crate::context::{ContextCombineFn, SideInputs, WithoutContext};
use crate::dataset::{Elem, Key, KeyedDataset};
use crate::grouped_values::{check_side_inputs, combine_grouped};
use crate::grouping::{Grouping, KeyHint};
use crate::hot_key::{FanoutFn, PerKeyWithHotKeyFanout};
use anyhow::Result;
use std::sync::Arc;

/// Combine the values of each key in each window to a single output value.
pub struct PerKey<C> {
    fn_: Arc<C>,
    few_keys: bool,
    side: Option<Arc<dyn SideInputs>>,
}

/// Per-key combine with a plain combiner.
pub fn per_key<C>(fn_: C) -> PerKey<WithoutContext<C>> {
    PerKey::from_arc(Arc::new(WithoutContext::new(fn_)))
}

/// Per-key combine with a context-aware combiner.
pub fn per_key_with_context<C>(fn_: C) -> PerKey<C> {
    PerKey::from_arc(Arc::new(fn_))
}

impl<C> PerKey<C> {
    pub(crate) fn from_arc(fn_: Arc<C>) -> Self {
        Self { fn_, few_keys: false, side: None }
    }

    /// Hint the grouping collaborator that few distinct keys are expected.
    /// The hint is forwarded, never interpreted here.
    pub fn with_few_keys(mut self) -> Self {
        self.few_keys = true;
        self
    }

    pub fn with_side_inputs(mut self, side: Arc<dyn SideInputs>) -> Self {
        self.side = Some(side);
        self
    }

    /// Shard every key's values across `fanout` sub-reductions before the
    /// final merge. Widths below 2 mean "do not shard".
    pub fn with_hot_key_fanout<K>(self, fanout: u32) -> PerKeyWithHotKeyFanout<K, C> {
        PerKeyWithHotKeyFanout::new(self.fn_, FanoutFn::constant(fanout), self.few_keys, self.side)
    }

    /// Like [`with_hot_key_fanout`](Self::with_hot_key_fanout), with a
    /// per-key width function.
    pub fn with_hot_key_fanout_fn<K, F>(self, fanout: F) -> PerKeyWithHotKeyFanout<K, C>
    where
        F: Fn(&K) -> u32 + Send + Sync + 'static,
    {
        PerKeyWithHotKeyFanout::new(self.fn_, FanoutFn::per_key(fanout), self.few_keys, self.side)
    }

    pub fn expand<K, V, A, O, G>(
        &self,
        input: KeyedDataset<K, V>,
        grouping: &G,
    ) -> Result<KeyedDataset<K, O>>
    where
        C: ContextCombineFn<V, A, O>,
        K: Key,
        V: Elem,
        A: Send,
        O: Elem,
        G: Grouping,
    {
        check_side_inputs(self.fn_.as_ref(), &self.side)?;
        let hint = if self.few_keys { KeyHint::FewKeys } else { KeyHint::Normal };
        let grouped = grouping.group_by_key(input, hint);
        Ok(combine_grouped(self.fn_.as_ref(), grouped, self.side.as_deref()))
    }
}
