//! Object-accumulator adapter.
//!
//! Instead of writing three free functions, an author can implement one
//! mutable accumulator object and let [`AccumulatingCombineFn`] delegate the
//! contract to it. The object is held by exclusive ownership for the life of
//! one reduction and never shared across batches.

use crate::combine_fn::CombineFn;
use crate::tenant::{Tagged, TenantId};

/// A user-owned accumulator object carrying a reduction's mutable state.
pub trait Accumulator<V, O>: Send + Sync + 'static {
    /// Fold one tagged input into this accumulator.
    fn add_input(&mut self, input: Tagged<V>);

    /// Fold the inputs represented by `other` into this accumulator.
    fn merge_from(&mut self, other: Self);

    /// Finalize this accumulator into an output value.
    fn extract(self) -> O;
}

/// Adapts an [`Accumulator`] factory into the full accumulation contract by
/// direct delegation.
pub struct AccumulatingCombineFn<F> {
    factory: F,
}

impl<F> AccumulatingCombineFn<F> {
    pub fn of(factory: F) -> Self {
        Self { factory }
    }
}

impl<V, A, O, F> CombineFn<V, A, O> for AccumulatingCombineFn<F>
where
    A: Accumulator<V, O>,
    F: Fn() -> A + Send + Sync + 'static,
    V: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn create(&self) -> Tagged<A> {
        Tagged::unknown((self.factory)())
    }

    fn add_input(&self, acc: Tagged<A>, input: Tagged<V>) -> Tagged<A> {
        let tenant = input.tenant.clone();
        let mut inner = acc.value;
        inner.add_input(input);
        Tagged::new(tenant, inner)
    }

    fn merge(&self, accs: Vec<Tagged<A>>) -> Tagged<A> {
        let mut merged = self.create();
        let mut tenant = TenantId::unknown();
        for partial in accs {
            tenant = partial.tenant;
            merged.value.merge_from(partial.value);
        }
        merged.retag(tenant)
    }

    fn extract(&self, acc: Tagged<A>) -> Tagged<O> {
        acc.map(Accumulator::extract)
    }
}
