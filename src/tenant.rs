//! Tenant attribution for every value flowing through the engine.
//!
//! Each raw input, partial accumulator, and output is a [`Tagged`] value: the
//! payload plus the [`TenantId`] it is attributed to. Steps re-tag values as
//! they combine them; nothing ever drops the attribution. The reserved
//! [`TenantId::unknown`] sentinel marks state that has no attribution yet
//! (freshly created empty accumulators, synthesized empty-input defaults).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved sentinel for values with no attribution.
const UNKNOWN_TENANT: &str = "<unknown>";

/// Attribution identifier of the tenant a value is accounted to.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved "no attribution" sentinel.
    pub fn unknown() -> Self {
        Self(UNKNOWN_TENANT.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_TENANT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/* ===================== Tagged<T> ===================== */

/// A value paired with the tenant it is attributed to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tagged<T> {
    pub tenant: TenantId,
    pub value: T,
}

impl<T> Tagged<T> {
    pub fn new(tenant: TenantId, value: T) -> Self {
        Self { tenant, value }
    }

    /// Tag a value with the "no attribution" sentinel.
    pub fn unknown(value: T) -> Self {
        Self::new(TenantId::unknown(), value)
    }

    /// Transform the payload, keeping the attribution.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Tagged<U> {
        Tagged::new(self.tenant, f(self.value))
    }

    /// Same payload, different attribution.
    pub fn retag(self, tenant: TenantId) -> Self {
        Self::new(tenant, self.value)
    }

    pub fn into_parts(self) -> (TenantId, T) {
        (self.tenant, self.value)
    }
}
