//! Side-input context and the context-aware combiner capability.
//!
//! Some combiners need access to side inputs while reducing. Rather than
//! duplicating every engine path for a plain and a context-aware variant,
//! the engine is written once against [`ContextCombineFn`] and plain
//! combiners are lifted into it with [`WithoutContext`], which threads the
//! context through unchanged and ignores it.

use crate::combine_fn::CombineFn;
use crate::tenant::Tagged;
use std::any::Any;

/// Opaque lookup into the surrounding pipeline's side inputs. The engine
/// never interprets what it hands back; it only threads the accessor through
/// to context-aware combiners.
pub trait SideInputs: Send + Sync {
    fn lookup(&self, tag: &str) -> Option<&(dyn Any + Send + Sync)>;
}

/// The empty accessor, used whenever no side inputs were supplied.
pub struct NoSideInputs;

impl SideInputs for NoSideInputs {
    fn lookup(&self, _tag: &str) -> Option<&(dyn Any + Send + Sync)> {
        None
    }
}

/// Per-operation context handed to context-aware combiners.
#[derive(Clone, Copy)]
pub struct CombineContext<'a> {
    side: &'a dyn SideInputs,
}

impl<'a> CombineContext<'a> {
    pub fn new(side: &'a dyn SideInputs) -> Self {
        Self { side }
    }

    /// Typed side-input lookup.
    pub fn side_input<T: 'static>(&self, tag: &str) -> Option<&'a T> {
        self.side.lookup(tag)?.downcast_ref()
    }
}

/* ===================== ContextCombineFn ===================== */

/// The combiner capability the engine actually consumes: the accumulation
/// contract with the context argument threaded through every operation.
///
/// Implement this directly for combiners that read side inputs; everything
/// else implements [`CombineFn`] and is lifted with [`WithoutContext`].
pub trait ContextCombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self, ctx: &CombineContext<'_>) -> Tagged<A>;

    fn add_input(&self, acc: Tagged<A>, input: Tagged<V>, ctx: &CombineContext<'_>) -> Tagged<A>;

    fn merge(&self, accs: Vec<Tagged<A>>, ctx: &CombineContext<'_>) -> Tagged<A>;

    fn compact(&self, acc: Tagged<A>, ctx: &CombineContext<'_>) -> Tagged<A> {
        let _ = ctx;
        acc
    }

    fn extract(&self, acc: Tagged<A>, ctx: &CombineContext<'_>) -> Tagged<O>;

    fn default_value(&self, ctx: &CombineContext<'_>) -> Tagged<O> {
        self.extract(self.create(ctx), ctx)
    }

    /// Whether this combiner actually reads the context. Supplying side
    /// inputs to a combiner that reports `false` is a configuration error.
    fn requires_context(&self) -> bool {
        true
    }
}

/// Lifts a plain [`CombineFn`] into the context-aware capability by ignoring
/// the context.
pub struct WithoutContext<C> {
    inner: C,
}

impl<C> WithoutContext<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C, V, A, O> ContextCombineFn<V, A, O> for WithoutContext<C>
where
    C: CombineFn<V, A, O>,
{
    fn create(&self, _ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.create()
    }

    fn add_input(&self, acc: Tagged<A>, input: Tagged<V>, _ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.add_input(acc, input)
    }

    fn merge(&self, accs: Vec<Tagged<A>>, _ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.merge(accs)
    }

    fn compact(&self, acc: Tagged<A>, _ctx: &CombineContext<'_>) -> Tagged<A> {
        self.inner.compact(acc)
    }

    fn extract(&self, acc: Tagged<A>, _ctx: &CombineContext<'_>) -> Tagged<O> {
        self.inner.extract(acc)
    }

    fn requires_context(&self) -> bool {
        false
    }
}
