use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Milliseconds since UNIX epoch (UTC).
pub type TimestampMs = i64;

/// A closed-open event-time range: [start, end).
///
/// Assignment of elements to windows is the windowing collaborator's job;
/// this engine only carries windows alongside values and groups by them.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq)]
pub struct Window {
    pub start: TimestampMs,
    pub end: TimestampMs,
}

impl Window {
    #[inline]
    pub fn new(start: TimestampMs, end: TimestampMs) -> Self {
        debug_assert!(end >= start);
        Self { start, end }
    }

    /// The single window covering all of event time.
    #[inline]
    pub fn global() -> Self {
        Self { start: TimestampMs::MIN, end: TimestampMs::MAX }
    }
}

// Hash/Ord so Windows can be used as grouping keys and sorted deterministically.
impl PartialEq for Window {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}
impl Hash for Window {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
    }
}
impl Ord for Window {
    #[inline]
    fn cmp(&self, o: &Self) -> std::cmp::Ordering {
        self.start.cmp(&o.start).then(self.end.cmp(&o.end))
    }
}
impl PartialOrd for Window {
    #[inline]
    fn partial_cmp(&self, o: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(o))
    }
}

/* ===================== Windowing strategy ===================== */

/// How fired panes of a window accumulate across triggerings.
///
/// Owned by the windowing collaborator; this engine reads it in exactly one
/// place: the hot-key pre-combine phase, which must never run in
/// `Accumulating` mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccumulationMode {
    Discarding,
    Accumulating,
}

/// Whether a dataset lives entirely in the global window or is windowed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    Global,
    Windowed,
}

/// The slice of the windowing collaborator's state this engine consumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowingStrategy {
    pub windowing: WindowKind,
    pub mode: AccumulationMode,
}

impl WindowingStrategy {
    /// Globally windowed, discarding fired panes. The strategy of freshly
    /// ingested unwindowed data.
    pub fn global() -> Self {
        Self { windowing: WindowKind::Global, mode: AccumulationMode::Discarding }
    }

    pub fn windowed(mode: AccumulationMode) -> Self {
        Self { windowing: WindowKind::Windowed, mode }
    }

    pub fn is_global(&self) -> bool {
        self.windowing == WindowKind::Global
    }

    /// Same strategy with `Accumulating` downgraded to `Discarding`.
    pub fn discarding(self) -> Self {
        Self { mode: AccumulationMode::Discarding, ..self }
    }
}
