//! Hot-key fan-out: two-phase tree reduction for skewed key distributions.
//!
//! A handful of keys can dominate input volume and serialize an otherwise
//! parallel per-key reduction. The fix is to shard each hot key's values
//! across `spread` nonce sub-keys, pre-combine every shard to a partial
//! accumulator, and only then merge the (at most `spread`) partials with the
//! untouched cold values under the original key. The final combine for a key
//! therefore sees at most `spread` pre-aggregated values plus its cold
//! elements, regardless of raw volume.
//!
//! Hot partials and cold raw inputs share one channel as
//! [`InputOrAccum`] values, crossing it through the [`UnionCodec`] wire
//! format. Both phase combiners are derived from the context-aware
//! capability, so a combiner's context threads through every operation
//! unchanged.

use crate::codec::{ElementCodec, InputOrAccum, UnionCodec};
use crate::context::{CombineContext, ContextCombineFn, SideInputs};
use crate::dataset::{Elem, Key, KeyedDataset, KeyedValue};
use crate::grouped_values::{check_side_inputs, combine_grouped};
use crate::grouping::{Grouping, KeyHint};
use crate::tenant::Tagged;
use crate::window::AccumulationMode;
use anyhow::{Context, Result};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/* ===================== Fan-out width ===================== */

/// Per-key fan-out width: how many sub-reductions a key's values are
/// sharded across before the final merge. Widths below 2 mean "cold path,
/// do not shard".
pub enum FanoutFn<K> {
    Constant(u32),
    PerKey(Arc<dyn Fn(&K) -> u32 + Send + Sync>),
}

impl<K> FanoutFn<K> {
    pub fn constant(fanout: u32) -> Self {
        Self::Constant(fanout)
    }

    pub fn per_key<F>(fanout: F) -> Self
    where
        F: Fn(&K) -> u32 + Send + Sync + 'static,
    {
        Self::PerKey(Arc::new(fanout))
    }

    /// Effective width for a key, clamped to at least 1.
    pub fn spread(&self, key: &K) -> u32 {
        let raw = match self {
            Self::Constant(n) => *n,
            Self::PerKey(f) => f(key),
        };
        raw.max(1)
    }
}

/* ===================== Phase combiners ===================== */

/// Phase-one combiner: the inner contract with extraction disabled, so a
/// shard's reduction stops at its (compacted) accumulator.
struct PreCombine<C, O> {
    inner: Arc<C>,
    _o: PhantomData<fn() -> O>,
}

impl<V, A, O, C> ContextCombineFn<V, A, A> for PreCombine<C, O>
where
    C: ContextCombineFn<V, A, O>,
    V: Send + Sync + 'static,
    A: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn create(&self, ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.create(ctx)
    }

    fn add_input(&self, acc: Tagged<A>, input: Tagged<V>, ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.add_input(acc, input, ctx)
    }

    fn merge(&self, accs: Vec<Tagged<A>>, ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.merge(accs, ctx)
    }

    fn compact(&self, acc: Tagged<A>, ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.compact(acc, ctx)
    }

    fn extract(&self, acc: Tagged<A>, _ctx: &CombineContext<'_>) -> Tagged<A> {
        acc
    }

    fn requires_context(&self) -> bool {
        self.inner.requires_context()
    }
}

/// Phase-two combiner over the unified channel: raw inputs fold through the
/// inner `add_input`, partial accumulators merge in; everything else
/// delegates.
struct PostCombine<C> {
    inner: Arc<C>,
}

impl<V, A, O, C> ContextCombineFn<InputOrAccum<V, A>, A, O> for PostCombine<C>
where
    C: ContextCombineFn<V, A, O>,
    V: Send + Sync + 'static,
    A: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn create(&self, ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.create(ctx)
    }

    fn add_input(
        &self,
        acc: Tagged<A>,
        input: Tagged<InputOrAccum<V, A>>,
        ctx: &CombineContext<'_>,
    ) -> Tagged<A> {
        let (tenant, value) = input.into_parts();
        match value {
            InputOrAccum::Input(v) => self.inner.add_input(acc, Tagged::new(tenant, v), ctx),
            InputOrAccum::Accum(a) => self.inner.merge(vec![acc, Tagged::new(tenant, a)], ctx),
        }
    }

    fn merge(&self, accs: Vec<Tagged<A>>, ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.merge(accs, ctx)
    }

    fn compact(&self, acc: Tagged<A>, ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.compact(acc, ctx)
    }

    fn extract(&self, acc: Tagged<A>, ctx: &CombineContext<'_>) -> Tagged<O> {
        self.inner.extract(acc, ctx)
    }

    fn requires_context(&self) -> bool {
        self.inner.requires_context()
    }
}

/* ===================== The fan-out engine ===================== */

/// Per-key combine with hot-key fan-out.
pub struct PerKeyWithHotKeyFanout<K, C> {
    fn_: Arc<C>,
    fanout: FanoutFn<K>,
    few_keys: bool,
    side: Option<Arc<dyn SideInputs>>,
}

impl<K, C> PerKeyWithHotKeyFanout<K, C> {
    pub(crate) fn new(
        fn_: Arc<C>,
        fanout: FanoutFn<K>,
        few_keys: bool,
        side: Option<Arc<dyn SideInputs>>,
    ) -> Self {
        Self { fn_, fanout, few_keys, side }
    }

    pub fn expand<V, A, O, G>(
        &self,
        input: KeyedDataset<K, V>,
        grouping: &G,
    ) -> Result<KeyedDataset<K, O>>
    where
        C: ContextCombineFn<V, A, O>,
        K: Key,
        V: Elem,
        A: Elem,
        O: Elem,
        G: Grouping,
    {
        check_side_inputs(self.fn_.as_ref(), &self.side)?;

        // The channel codec is settled before any element is touched.
        let codec = UnionCodec::<V, A>::postcard();

        // Split hot from cold, augmenting hot keys with a nonce. The counter
        // is local to this batch; it only has to spread values within it.
        let mut counter: u64 = rand::random();
        let mut hot: Vec<KeyedValue<(K, u32), V>> = Vec::new();
        let mut cold: Vec<KeyedValue<K, InputOrAccum<V, A>>> = Vec::new();
        for element in input.elements {
            let spread = self.fanout.spread(&element.key);
            if spread <= 1 {
                cold.push(KeyedValue {
                    window: element.window,
                    key: element.key,
                    value: element.value.map(InputOrAccum::Input),
                });
            } else {
                let nonce = (counter % u64::from(spread)) as u32;
                counter = counter.wrapping_add(1);
                hot.push(KeyedValue {
                    window: element.window,
                    key: (element.key, nonce),
                    value: element.value,
                });
            }
        }
        debug!(hot = hot.len(), cold = cold.len(), "hot-key split");

        // Phase one never runs in accumulating mode: a pane fired here would
        // be merged again downstream and double-count.
        let pre_strategy = input.strategy.discarding();
        if input.strategy.mode == AccumulationMode::Accumulating {
            debug!("pre-combine downgraded to discarding fired panes");
        }

        let pre = PreCombine { inner: Arc::clone(&self.fn_), _o: PhantomData::<fn() -> O> };
        let hot_dataset = KeyedDataset { strategy: pre_strategy, elements: hot };
        let precombined =
            combine_grouped(&pre, grouping.group_by_key(hot_dataset, KeyHint::Normal), self.side.as_deref());

        // Strip the nonce; a shard's partial joins the channel as an
        // accumulator alongside the cold raw inputs.
        let hot_prepared = precombined.elements.into_iter().map(|element| KeyedValue {
            window: element.window,
            key: element.key.0,
            value: element.value.map(InputOrAccum::Accum),
        });

        // Union the two paths under the original windowing; every element
        // crosses the channel through the union wire format.
        let mut channel: Vec<KeyedValue<K, InputOrAccum<V, A>>> = Vec::new();
        for element in hot_prepared.chain(cold) {
            let mut buf = Vec::new();
            codec.encode(&element.value, &mut buf).context("hot-key channel encode")?;
            let mut bytes = buf.as_slice();
            let value = codec.decode(&mut bytes).context("hot-key channel decode")?;
            channel.push(KeyedValue { window: element.window, key: element.key, value });
        }
        let unioned = KeyedDataset { strategy: input.strategy, elements: channel };

        let hint = if self.few_keys { KeyHint::FewKeys } else { KeyHint::Normal };
        let post = PostCombine { inner: Arc::clone(&self.fn_) };
        Ok(combine_grouped(&post, grouping.group_by_key(unioned, hint), self.side.as_deref()))
    }
}
