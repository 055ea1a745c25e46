//! Global combining: reduce a whole dataset to one value per window.
//!
//! Implemented by keying every element under the unit key and running the
//! per-key machinery (fanned out when requested), then unwrapping the
//! values. Empty input in the global window can synthesize the combiner's
//! default value; for windowed data that synthesis has no window to land in
//! and must be disabled with [`Globally::without_defaults`].

use crate::context::{CombineContext, ContextCombineFn, NoSideInputs, SideInputs, WithoutContext};
use crate::dataset::{Dataset, Elem, KeyedDataset, KeyedValue, WindowedValue};
use crate::grouping::Grouping;
use crate::per_key::PerKey;
use crate::window::Window;
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::debug;

/// Combine all elements of a dataset into a single per-window value.
pub struct Globally<C> {
    fn_: Arc<C>,
    insert_default: bool,
    fanout: u32,
    side: Option<Arc<dyn SideInputs>>,
}

/// Global combine with a plain combiner.
pub fn globally<C>(fn_: C) -> Globally<WithoutContext<C>> {
    Globally { fn_: Arc::new(WithoutContext::new(fn_)), insert_default: true, fanout: 0, side: None }
}

/// Global combine with a context-aware combiner.
pub fn globally_with_context<C>(fn_: C) -> Globally<C> {
    Globally { fn_: Arc::new(fn_), insert_default: true, fanout: 0, side: None }
}

impl<C> Globally<C> {
    /// Do not synthesize a default value for empty input. Required when the
    /// input is not globally windowed.
    pub fn without_defaults(mut self) -> Self {
        self.insert_default = false;
        self
    }

    /// Pre-reduce through `fanout` intermediate shards to relieve the final
    /// single-key combine. Values below 2 select the plain path.
    pub fn with_fanout(mut self, fanout: u32) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn with_side_inputs(mut self, side: Arc<dyn SideInputs>) -> Self {
        self.side = Some(side);
        self
    }

    pub fn expand<V, A, O, G>(&self, input: Dataset<V>, grouping: &G) -> Result<Dataset<O>>
    where
        C: ContextCombineFn<V, A, O>,
        V: Elem,
        A: Elem,
        O: Elem,
        G: Grouping,
    {
        if self.insert_default && !input.strategy.is_global() {
            bail!(
                "default values require globally windowed input; \
                 call without_defaults() for windowed data"
            );
        }

        let strategy = input.strategy;
        let keyed = KeyedDataset {
            strategy,
            elements: input
                .elements
                .into_iter()
                .map(|element| KeyedValue { window: element.window, key: (), value: element.value })
                .collect(),
        };

        // The whole dataset lives under one key, so the grouping
        // collaborator always gets the few-keys hint here.
        let combine = PerKey::from_arc(Arc::clone(&self.fn_));
        let combine = match self.side.clone() {
            Some(side) => combine.with_side_inputs(side),
            None => combine,
        };
        let combine = combine.with_few_keys();
        let combined: KeyedDataset<(), O> = if self.fanout >= 2 {
            combine.with_hot_key_fanout(self.fanout).expand(keyed, grouping)?
        } else {
            combine.expand(keyed, grouping)?
        };

        let mut elements: Vec<WindowedValue<O>> = combined
            .elements
            .into_iter()
            .map(|element| WindowedValue { window: element.window, value: element.value })
            .collect();

        if self.insert_default && elements.is_empty() {
            debug!("empty input: synthesizing default value");
            let side = self.side.clone();
            let side_ref: &dyn SideInputs = side.as_deref().unwrap_or(&NoSideInputs);
            let ctx = CombineContext::new(side_ref);
            elements.push(WindowedValue {
                window: Window::global(),
                value: self.fn_.default_value(&ctx),
            });
        }

        Ok(Dataset { strategy, elements })
    }
}
