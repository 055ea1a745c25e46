//! # Keyfold
//!
//! A **distributable combine engine**: hand it an associative-commutative
//! reduction and it executes the reduction over a keyed, windowed dataset as
//! a tree of partial combines — safely parallel across disjoint groups,
//! correct per key, and with every value's tenant attribution carried
//! through.
//!
//! ## Core Concepts
//!
//! ### The accumulation contract
//!
//! A [`CombineFn`] describes one reduction through five operations:
//! `create`, `add_input`, `merge`, `compact`, and `extract`. Any partition
//! of the input into batches, reduced batch-wise and merged in any order,
//! must extract the same output as a single-batch fold. That law is what
//! lets the engine reduce in trees and shard hot keys.
//!
//! ### Specializations
//!
//! Most reductions don't need the full contract spelled out. The
//! [`combiners`] module derives it mechanically from smaller interfaces:
//! a binary operator with optional identity ([`combiners::BinaryCombineFn`]),
//! a primitive operator with total identity
//! ([`combiners::PrimitiveCombineFn`]), a reduce-many function with buffering
//! ([`combiners::BufferingCombineFn`]), or a user-owned accumulator object
//! ([`combiners::AccumulatingCombineFn`]). Ready-made: [`combiners::sum`],
//! [`combiners::min`], [`combiners::max`], [`combiners::Count`].
//!
//! ### Tenant attribution
//!
//! Every value is a [`Tagged`] value: payload plus [`TenantId`]. Combining
//! re-tags results according to each specialization's documented rule;
//! nothing drops attribution, and only empty-reduction state carries the
//! unknown-tenant sentinel.
//!
//! ### Entry points
//!
//! - [`globally()`] — one value per window over the whole dataset, with
//!   optional default synthesis for empty input and optional fan-out.
//! - [`per_key()`] — one value per key per window; hot keys can be sharded
//!   with [`PerKey::with_hot_key_fanout`].
//! - [`grouped_values()`] — the same reduction over input that something
//!   else already grouped.
//!
//! Grouping, windowing, side-input access and element serialization are
//! external collaborators behind narrow interfaces ([`Grouping`],
//! [`WindowingStrategy`], [`SideInputs`], [`ElementCodec`]); scheduling and
//! retry policy belong to the surrounding execution engine.
//!
//! ## Quick Start
//!
//! ```
//! use keyfold::combiners::sum;
//! use keyfold::{HashGrouping, KeyedDataset, Tagged, TenantId, per_key};
//!
//! # fn main() -> anyhow::Result<()> {
//! let sales = KeyedDataset::global(vec![
//!     ("north".to_string(), Tagged::new(TenantId::new("acme"), 12u64)),
//!     ("south".to_string(), Tagged::new(TenantId::new("acme"), 7u64)),
//!     ("north".to_string(), Tagged::new(TenantId::new("initech"), 30u64)),
//! ]);
//!
//! let totals = per_key(sum::<u64>()).expand(sales, &HashGrouping)?;
//! let mut out: Vec<(String, u64)> =
//!     totals.elements.into_iter().map(|kv| (kv.key, kv.value.value)).collect();
//! out.sort();
//! assert_eq!(out, vec![("north".to_string(), 42), ("south".to_string(), 7)]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Hot-key fan-out
//!
//! When a few keys dominate input volume, `with_hot_key_fanout` reshapes the
//! reduction into two phases: values of a hot key are sharded across nonce
//! sub-keys and pre-combined to partial accumulators, then the partials and
//! the cold values are merged per key. The output is identical to the
//! unfanned reduction for every width; only the shape of the tree changes.
//!
//! ## Module Overview
//!
//! - [`combine_fn`] - the accumulation contract
//! - [`combiners`] - specializations and ready-made combiners
//! - [`context`] - side-input context and the context-aware capability
//! - [`global`] / [`mod@per_key`] / [`mod@grouped_values`] - the three
//!   combine entry points
//! - [`hot_key`] - the fan-out engine
//! - [`codec`] - the tagged-union channel wire format
//! - [`grouping`] - the group-by-key collaborator interface
//! - [`dataset`] / [`window`] / [`tenant`] - the data model
//! - [`testing`] - helpers for testing combiners and pipelines

pub mod codec;
pub mod combine_fn;
pub mod combiners;
pub mod context;
pub mod dataset;
pub mod global;
pub mod grouped_values;
pub mod grouping;
pub mod hot_key;
pub mod per_key;
pub mod tenant;
pub mod testing;
pub mod window;

pub use codec::{ElementCodec, InputOrAccum, PostcardCodec, UnionCodec};
pub use combine_fn::CombineFn;
pub use context::{CombineContext, ContextCombineFn, NoSideInputs, SideInputs, WithoutContext};
pub use dataset::{
    Dataset, Elem, GroupedDataset, Key, KeyedDataset, KeyedValue, ValueGroup, WindowedValue,
};
pub use global::{Globally, globally, globally_with_context};
pub use grouped_values::{GroupedValues, grouped_values, grouped_values_with_context};
pub use grouping::{Grouping, HashGrouping, KeyHint};
pub use hot_key::{FanoutFn, PerKeyWithHotKeyFanout};
pub use per_key::{PerKey, per_key, per_key_with_context};
pub use tenant::{Tagged, TenantId};
pub use window::{AccumulationMode, TimestampMs, Window, WindowKind, WindowingStrategy};
