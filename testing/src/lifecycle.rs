//! Monotonic lifecycle of an ephemeral instance.
//!
//! ```text
//! NotStarted ──► Starting ──► Running ──► Stopped
//!                    │                       ▲
//!                    └──── (start failed) ───┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of an ephemeral instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Lifecycle {
    /// Created, nothing launched yet.
    NotStarted = 0,
    /// Container launch in flight.
    Starting = 1,
    /// Ready; the endpoint is readable.
    Running = 2,
    /// Torn down or failed to start. Terminal.
    Stopped = 3,
}

impl Lifecycle {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Starting,
            2 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not-started"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Atomic holder for a [`Lifecycle`].
///
/// Only forward transitions are ever requested; `transition` is a
/// compare-and-swap so two starters cannot both win.
#[derive(Debug)]
pub(crate) struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(Lifecycle::NotStarted as u8))
    }

    pub(crate) fn load(&self) -> Lifecycle {
        Lifecycle::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move `from → to`; on failure returns the state actually observed.
    pub(crate) fn transition(&self, from: Lifecycle, to: Lifecycle) -> Result<(), Lifecycle> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(Lifecycle::from_u8)
    }

    pub(crate) fn store(&self, state: Lifecycle) {
        self.0.store(state as u8, Ordering::Release);
    }
}
