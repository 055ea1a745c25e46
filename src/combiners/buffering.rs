//! Buffering adapter for reduce-many combiners.
//!
//! Wraps a function that reduces a whole batch of values to one value into a
//! full combiner. Inputs are buffered and periodically collapsed so the
//! accumulator stays bounded no matter how many values a key receives, at
//! the cost of extra reduce-many invocations.

use crate::combine_fn::CombineFn;
use crate::dataset::Elem;
use crate::tenant::Tagged;
use std::marker::PhantomData;

/// Values buffered before an eager compaction kicks in.
const DEFAULT_BUFFER_SIZE: usize = 20;

/// Combiner built from a reduce-many function `Fn(Vec<V>) -> V`.
///
/// - Accumulator: `Vec<V>`, never longer than `buffer_size` between calls
/// - Output: `V`
///
/// `add_input` appends; once the buffer exceeds `buffer_size` it is
/// immediately reduced to a single element. `merge` concatenates all buffers
/// and compacts once. With extract on an empty reduction the reduce-many
/// function is invoked on an empty `Vec`, so it must have an answer for
/// that case. Merged accumulators take the tenant of the last accumulator
/// consumed.
pub struct BufferingCombineFn<V, F> {
    reduce: F,
    buffer_size: usize,
    _v: PhantomData<fn() -> V>,
}

impl<V, F> BufferingCombineFn<V, F>
where
    F: Fn(Vec<V>) -> V,
{
    pub fn of(reduce: F) -> Self {
        Self { reduce, buffer_size: DEFAULT_BUFFER_SIZE, _v: PhantomData }
    }

    /// Buffer at least `buffer_size` values between reduce-many invocations.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        assert!(buffer_size >= 1, "buffer_size must be at least 1");
        self.buffer_size = buffer_size;
        self
    }

    fn reduce_to_singleton(&self, acc: Tagged<Vec<V>>) -> Tagged<Vec<V>> {
        acc.map(|values| vec![(self.reduce)(values)])
    }
}

impl<V, F> CombineFn<V, Vec<V>, V> for BufferingCombineFn<V, F>
where
    V: Elem,
    F: Fn(Vec<V>) -> V + Send + Sync + 'static,
{
    fn create(&self) -> Tagged<Vec<V>> {
        Tagged::unknown(Vec::new())
    }

    fn add_input(&self, acc: Tagged<Vec<V>>, input: Tagged<V>) -> Tagged<Vec<V>> {
        let (tenant, value) = input.into_parts();
        let mut buffer = acc.value;
        buffer.push(value);
        let acc = Tagged::new(tenant, buffer);
        if acc.value.len() > self.buffer_size {
            self.reduce_to_singleton(acc)
        } else {
            acc
        }
    }

    fn merge(&self, accs: Vec<Tagged<Vec<V>>>) -> Tagged<Vec<V>> {
        let mut merged = self.create();
        for acc in accs {
            let (tenant, mut values) = acc.into_parts();
            merged.value.append(&mut values);
            merged.tenant = tenant;
        }
        self.compact(merged)
    }

    fn compact(&self, acc: Tagged<Vec<V>>) -> Tagged<Vec<V>> {
        if acc.value.len() > 1 {
            self.reduce_to_singleton(acc)
        } else {
            acc
        }
    }

    fn extract(&self, acc: Tagged<Vec<V>>) -> Tagged<V> {
        acc.map(|values| (self.reduce)(values))
    }
}
