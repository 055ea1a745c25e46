//! Standard combiner specializations built atop the accumulation contract.
//!
//! Each specialization trades generality for a shorter way to express a
//! reduction:
//!
//! - [`BinaryCombineFn`] -- derive the contract from one binary operation
//!   with an optional identity.
//! - [`PrimitiveCombineFn`] -- the same, for `Copy` primitives whose
//!   operation has a total identity (no optional branch).
//! - [`BufferingCombineFn`] -- derive it from a reduce-many function,
//!   buffering inputs and compacting eagerly to bound memory.
//! - [`AccumulatingCombineFn`] -- delegate the contract to a user-owned
//!   [`Accumulator`] object.
//!
//! Plus ready-made instances: [`sum`], [`min`], [`max`], [`Count`].
//!
//! # Examples
//! ```
//! use keyfold::combiners::{sum, BufferingCombineFn};
//! use keyfold::{CombineFn, Tagged, TenantId};
//!
//! let total = sum::<u64>().apply(vec![
//!     Tagged::new(TenantId::new("a"), 1),
//!     Tagged::new(TenantId::new("b"), 2),
//! ]);
//! assert_eq!(total.value, 3);
//!
//! let concat = BufferingCombineFn::of(|parts: Vec<String>| parts.concat());
//! let joined = concat.apply(vec![
//!     Tagged::new(TenantId::new("a"), "x".to_string()),
//!     Tagged::new(TenantId::new("a"), "y".to_string()),
//! ]);
//! assert_eq!(joined.value, "xy");
//! ```

mod accumulating;
mod basic;
mod binary;
mod buffering;

pub use accumulating::{AccumulatingCombineFn, Accumulator};
pub use basic::{Count, Max, Min, Sum, max, min, sum};
pub use binary::{BinaryCombineFn, BinaryOp, PrimitiveCombineFn, TotalBinaryOp};
pub use buffering::BufferingCombineFn;
