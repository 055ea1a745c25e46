//! Combining of already-grouped values.
//!
//! Takes the grouping collaborator's output, `(key, values)` per window, and
//! folds each group through the combiner exactly once, re-attaching the
//! group's key and window to the output. Groups are disjoint, so they fan
//! out across threads with each fold exclusively owning its accumulator.

use crate::context::{CombineContext, ContextCombineFn, NoSideInputs, SideInputs, WithoutContext};
use crate::dataset::{Elem, GroupedDataset, Key, KeyedDataset, KeyedValue, ValueGroup};
use anyhow::{Result, bail};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Combine per group over pre-grouped input.
///
/// Output codec resolution is deferred here: no codec is derived, a later
/// pipeline stage may settle it.
pub struct GroupedValues<C> {
    fn_: Arc<C>,
    side: Option<Arc<dyn SideInputs>>,
}

/// Combine pre-grouped `(key, values)` pairs with a plain combiner.
pub fn grouped_values<C>(fn_: C) -> GroupedValues<WithoutContext<C>> {
    GroupedValues { fn_: Arc::new(WithoutContext::new(fn_)), side: None }
}

/// Combine pre-grouped `(key, values)` pairs with a context-aware combiner.
pub fn grouped_values_with_context<C>(fn_: C) -> GroupedValues<C> {
    GroupedValues { fn_: Arc::new(fn_), side: None }
}

impl<C> GroupedValues<C> {
    pub fn with_side_inputs(mut self, side: Arc<dyn SideInputs>) -> Self {
        self.side = Some(side);
        self
    }

    pub fn expand<K, V, A, O>(&self, input: GroupedDataset<K, V>) -> Result<KeyedDataset<K, O>>
    where
        C: ContextCombineFn<V, A, O>,
        K: Key,
        V: Elem,
        A: Send,
        O: Elem,
    {
        check_side_inputs(self.fn_.as_ref(), &self.side)?;

        // Malformed grouped input: the same (window, key) appearing twice
        // means the upstream grouping broke its contract.
        let mut seen = HashSet::new();
        for group in &input.groups {
            if !seen.insert((group.window, group.key.clone())) {
                bail!("grouped-values input has more than one group for one key and window");
            }
        }

        let side = self.side.clone();
        Ok(combine_grouped(self.fn_.as_ref(), input, side.as_deref()))
    }
}

/// Expansion-time configuration check shared by every combine entry point.
pub(crate) fn check_side_inputs<C, V, A, O>(
    fn_: &C,
    side: &Option<Arc<dyn SideInputs>>,
) -> Result<()>
where
    C: ContextCombineFn<V, A, O>,
{
    if side.is_some() && !fn_.requires_context() {
        bail!("side inputs supplied to a combiner that does not use context");
    }
    Ok(())
}

/// The per-group fold every combine path bottoms out in: create, add each
/// value, compact, extract. One fold per group, fanned across threads.
pub(crate) fn combine_grouped<C, K, V, A, O>(
    fn_: &C,
    input: GroupedDataset<K, V>,
    side: Option<&dyn SideInputs>,
) -> KeyedDataset<K, O>
where
    C: ContextCombineFn<V, A, O>,
    K: Key,
    V: Elem,
    A: Send,
    O: Elem,
{
    let side = side.unwrap_or(&NoSideInputs);
    let elements = input
        .groups
        .into_par_iter()
        .map(|group| combine_one_group(fn_, group, &CombineContext::new(side)))
        .collect();
    KeyedDataset { strategy: input.strategy, elements }
}

fn combine_one_group<C, K, V, A, O>(
    fn_: &C,
    group: ValueGroup<K, V>,
    ctx: &CombineContext<'_>,
) -> KeyedValue<K, O>
where
    C: ContextCombineFn<V, A, O>,
{
    let mut acc = fn_.create(ctx);
    for value in group.values {
        acc = fn_.add_input(acc, value, ctx);
    }
    let acc = fn_.compact(acc, ctx);
    KeyedValue { window: group.window, key: group.key, value: fn_.extract(acc, ctx) }
}
