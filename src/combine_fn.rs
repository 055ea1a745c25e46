//! The accumulation contract every combiner implements.
//!
//! A combiner is a stateless, shareable strategy describing one
//! associative-commutative reduction. The engine drives it through five
//! operations: [`create`](CombineFn::create), [`add_input`](CombineFn::add_input),
//! [`merge`](CombineFn::merge), [`compact`](CombineFn::compact) and
//! [`extract`](CombineFn::extract). Any partition of a finite input multiset
//! into batches, reduced batch-wise and merged in any order, must extract the
//! same output as a single-batch fold; that law is what makes the tree
//! reduction (and the hot-key fan-out on top of it) safe.
//!
//! Accumulators are exclusively owned by the combine step that created them:
//! operations take them by value and hand them back, so an implementation may
//! mutate-and-return or build fresh state, whichever is cheaper.

use crate::tenant::Tagged;

/// One associative-commutative reduction: how to start it, feed it, merge
/// disjoint partial states, shrink them, and finalize.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    /// Fresh state representing the reduction of zero inputs. Tagged with the
    /// unknown-tenant sentinel; idempotent, no side effects.
    fn create(&self) -> Tagged<A>;

    /// Fold one value into the accumulator. Once the accumulator is
    /// non-empty the result adopts the input's tenant.
    fn add_input(&self, acc: Tagged<A>, input: Tagged<V>) -> Tagged<A>;

    /// Combine accumulators built from disjoint batches. An empty sequence
    /// must behave exactly like [`create`](Self::create).
    fn merge(&self, accs: Vec<Tagged<A>>) -> Tagged<A>;

    /// A smaller, logically equivalent form of the accumulator. The engine
    /// calls this after every group fold and before an accumulator crosses
    /// an internal channel. Default: identity.
    fn compact(&self, acc: Tagged<A>) -> Tagged<A> {
        acc
    }

    /// Finalize the reduction. Called exactly once per logical reduction,
    /// after all folding and merging.
    fn extract(&self, acc: Tagged<A>) -> Tagged<O>;

    /// The output for an empty reduction.
    fn default_value(&self) -> Tagged<O> {
        self.extract(self.create())
    }

    /// Single-batch convenience fold: create, add every input, extract.
    /// Never calls [`merge`](Self::merge).
    fn apply<I>(&self, inputs: I) -> Tagged<O>
    where
        I: IntoIterator<Item = Tagged<V>>,
        Self: Sized,
    {
        let mut acc = self.create();
        for input in inputs {
            acc = self.add_input(acc, input);
        }
        self.extract(acc)
    }
}
