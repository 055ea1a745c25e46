//! Combiners expressed as a single binary operation.
//!
//! Two adapters derive the full accumulation contract mechanically from one
//! polymorphic operator interface:
//!
//! - [`BinaryCombineFn`] over a [`BinaryOp`] whose identity may not exist —
//!   the accumulator is `Option<V>` and the output is the operator's
//!   (nullable) identity for empty reductions.
//! - [`PrimitiveCombineFn`] over a [`TotalBinaryOp`] with a total identity —
//!   the accumulator is a single `Copy` cell seeded with the identity, so no
//!   optional branch ever runs.

use crate::combine_fn::CombineFn;
use crate::dataset::Elem;
use crate::tenant::Tagged;

/* ===================== BinaryOp / BinaryCombineFn ===================== */

/// A binary merge operation, possibly without an identity element.
///
/// Must be associative and commutative. The operator decides the tenant of
/// its result, which is also the tenant rule for merged accumulators.
pub trait BinaryOp<V>: Send + Sync + 'static {
    /// Combine two operands.
    fn apply(&self, left: Tagged<V>, right: Tagged<V>) -> Tagged<V>;

    /// The value an empty reduction extracts to, if the operation has one.
    fn identity(&self) -> Option<V> {
        None
    }
}

/// Derives a combiner from a [`BinaryOp`].
///
/// - Accumulator: `Option<V>` (unset until the first input)
/// - Output: `Option<V>` (the operator's identity when nothing was folded)
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCombineFn<B> {
    op: B,
}

impl<B> BinaryCombineFn<B> {
    pub fn of(op: B) -> Self {
        Self { op }
    }
}

impl<V, B> CombineFn<V, Option<V>, Option<V>> for BinaryCombineFn<B>
where
    V: Elem,
    B: BinaryOp<V>,
{
    fn create(&self) -> Tagged<Option<V>> {
        Tagged::unknown(None)
    }

    fn add_input(&self, acc: Tagged<Option<V>>, input: Tagged<V>) -> Tagged<Option<V>> {
        match acc.value {
            // First input: the accumulator becomes it, tenant and all.
            None => input.map(Some),
            Some(cur) => {
                let tenant = input.tenant.clone();
                let out = self.op.apply(Tagged::unknown(cur), Tagged::unknown(input.value));
                Tagged::new(tenant, Some(out.value))
            }
        }
    }

    fn merge(&self, accs: Vec<Tagged<Option<V>>>) -> Tagged<Option<V>> {
        // Left-fold over the set accumulators; the operator assigns tenants.
        let mut running: Option<Tagged<V>> = None;
        for acc in accs {
            let Tagged { tenant, value } = acc;
            let Some(value) = value else { continue };
            running = Some(match running {
                None => Tagged::new(tenant, value),
                Some(left) => self.op.apply(left, Tagged::new(tenant, value)),
            });
        }
        match running {
            Some(v) => v.map(Some),
            None => self.create(),
        }
    }

    fn extract(&self, acc: Tagged<Option<V>>) -> Tagged<Option<V>> {
        match acc.value {
            Some(_) => acc,
            None => Tagged::unknown(self.op.identity()),
        }
    }
}

/* ===================== TotalBinaryOp / PrimitiveCombineFn ===================== */

/// A binary operation over a `Copy` primitive with a total identity:
/// `apply(identity(), x) == apply(x, identity()) == x` for every `x`.
pub trait TotalBinaryOp<V: Copy>: Send + Sync + 'static {
    fn apply(&self, left: V, right: V) -> V;

    fn identity(&self) -> V;
}

/// Derives a combiner from a [`TotalBinaryOp`].
///
/// - Accumulator: `V`, seeded with the identity
/// - Output: `V`
///
/// Merged accumulators take the tenant of the last accumulator consumed in
/// the fold.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrimitiveCombineFn<B> {
    op: B,
}

impl<B> PrimitiveCombineFn<B> {
    pub fn of(op: B) -> Self {
        Self { op }
    }
}

impl<V, B> CombineFn<V, V, V> for PrimitiveCombineFn<B>
where
    V: Elem + Copy,
    B: TotalBinaryOp<V>,
{
    fn create(&self) -> Tagged<V> {
        Tagged::unknown(self.op.identity())
    }

    fn add_input(&self, acc: Tagged<V>, input: Tagged<V>) -> Tagged<V> {
        Tagged::new(input.tenant, self.op.apply(acc.value, input.value))
    }

    fn merge(&self, accs: Vec<Tagged<V>>) -> Tagged<V> {
        let mut merged = self.create();
        for acc in accs {
            merged = Tagged::new(acc.tenant, self.op.apply(merged.value, acc.value));
        }
        merged
    }

    fn extract(&self, acc: Tagged<V>) -> Tagged<V> {
        acc
    }
}
