//! Element codecs for engine-internal channels.
//!
//! Serialization of pipeline data at large is a pluggable service owned by
//! the surrounding system; this engine only defines the one wire format it
//! owns, the tagged-union encoding of the hot-key fan-out channel, and a
//! default element codec to delegate to.

use crate::dataset::Elem;
use crate::tenant::Tagged;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// A pluggable element codec.
///
/// `decode` consumes from the front of `source`, leaving the rest in place,
/// so codecs can be nested.
pub trait ElementCodec<T>: Send + Sync {
    fn encode(&self, value: &T, sink: &mut Vec<u8>) -> Result<()>;

    fn decode(&self, source: &mut &[u8]) -> Result<T>;

    /// Whether equal values always encode to equal bytes.
    fn is_deterministic(&self) -> bool;
}

/* ===================== PostcardCodec ===================== */

/// Default binary codec for any [`Elem`].
pub struct PostcardCodec<T>(PhantomData<fn() -> T>);

impl<T> PostcardCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PostcardCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Elem> ElementCodec<T> for PostcardCodec<T> {
    fn encode(&self, value: &T, sink: &mut Vec<u8>) -> Result<()> {
        let bytes = postcard::to_allocvec(value).context("postcard encode")?;
        sink.extend_from_slice(&bytes);
        Ok(())
    }

    fn decode(&self, source: &mut &[u8]) -> Result<T> {
        let (value, rest) = postcard::take_from_bytes(source).context("postcard decode")?;
        *source = rest;
        Ok(value)
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

/* ===================== InputOrAccum + UnionCodec ===================== */

/// Either a raw input or a partial accumulator, so both can share one
/// channel. Exactly one variant is ever populated, by construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputOrAccum<V, A> {
    Input(V),
    Accum(A),
}

/// Marker bytes of the union wire format.
const MARKER_INPUT: u8 = 0;
const MARKER_ACCUM: u8 = 1;

/// Codec for tagged [`InputOrAccum`] values: one marker byte (`0` for an
/// input, `1` for an accumulator) followed by the variant's own tagged
/// encoding. Deterministic iff both delegate codecs are.
///
/// This is the only wire format this engine owns. It is used on the hot-key
/// fan-out channel and nowhere else.
pub struct UnionCodec<V, A> {
    input: Arc<dyn ElementCodec<Tagged<V>>>,
    accum: Arc<dyn ElementCodec<Tagged<A>>>,
}

impl<V, A> UnionCodec<V, A>
where
    V: Elem,
    A: Elem,
{
    pub fn new(
        input: Arc<dyn ElementCodec<Tagged<V>>>,
        accum: Arc<dyn ElementCodec<Tagged<A>>>,
    ) -> Self {
        Self { input, accum }
    }

    /// Union codec over the default element codec on both sides.
    pub fn postcard() -> Self {
        Self::new(
            Arc::new(PostcardCodec::<Tagged<V>>::new()),
            Arc::new(PostcardCodec::<Tagged<A>>::new()),
        )
    }
}

impl<V, A> ElementCodec<Tagged<InputOrAccum<V, A>>> for UnionCodec<V, A>
where
    V: Elem,
    A: Elem,
{
    fn encode(&self, value: &Tagged<InputOrAccum<V, A>>, sink: &mut Vec<u8>) -> Result<()> {
        match &value.value {
            InputOrAccum::Input(v) => {
                sink.push(MARKER_INPUT);
                let tagged = Tagged::new(value.tenant.clone(), v.clone());
                self.input.encode(&tagged, sink)
            }
            InputOrAccum::Accum(a) => {
                sink.push(MARKER_ACCUM);
                let tagged = Tagged::new(value.tenant.clone(), a.clone());
                self.accum.encode(&tagged, sink)
            }
        }
    }

    fn decode(&self, source: &mut &[u8]) -> Result<Tagged<InputOrAccum<V, A>>> {
        let Some((&marker, rest)) = source.split_first() else {
            bail!("union decode: empty input");
        };
        *source = rest;
        match marker {
            MARKER_INPUT => Ok(self.input.decode(source)?.map(InputOrAccum::Input)),
            MARKER_ACCUM => Ok(self.accum.decode(source)?.map(InputOrAccum::Accum)),
            other => bail!("union decode: unknown marker byte {other}"),
        }
    }

    fn is_deterministic(&self) -> bool {
        self.input.is_deterministic() && self.accum.is_deterministic()
    }
}
