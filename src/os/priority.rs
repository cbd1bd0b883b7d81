//! Cross-platform thread scheduling priority descriptors.
//!
//! One descriptor type covers both native families: the fixed priority
//! classes of the Windows scheduler and the policy-plus-level model of POSIX
//! hosts. Translation to native calls happens at the thread boundary; a
//! combination the host cannot represent is an explicit
//! [`PriorityError::Unsupported`] / [`PriorityError::InvalidLevel`], never a
//! silent approximation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduling class tag, drawn from both host families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    /// Host default scheduling. Valid everywhere and never requires a
    /// native call.
    #[default]
    Default,
    /// Runs only when nothing else wants the CPU (`THREAD_PRIORITY_IDLE` /
    /// `SCHED_IDLE`).
    Idle,
    /// Windows `THREAD_PRIORITY_LOWEST`.
    Lowest,
    /// Windows `THREAD_PRIORITY_BELOW_NORMAL`.
    BelowNormal,
    /// Normal scheduling (`THREAD_PRIORITY_NORMAL` / `SCHED_OTHER`).
    Normal,
    /// Windows `THREAD_PRIORITY_ABOVE_NORMAL`.
    AboveNormal,
    /// Windows `THREAD_PRIORITY_HIGHEST`.
    Highest,
    /// Windows `THREAD_PRIORITY_TIME_CRITICAL`.
    TimeCritical,
    /// POSIX `SCHED_BATCH`.
    Batch,
    /// POSIX `SCHED_FIFO` realtime policy; requires a level in `1..=99`.
    Fifo,
    /// POSIX `SCHED_RR` realtime policy; requires a level in `1..=99`.
    RoundRobin,
}

impl PriorityClass {
    /// Whether this class carries a meaningful numeric level.
    #[must_use]
    pub const fn is_realtime(self) -> bool {
        matches!(self, Self::Fifo | Self::RoundRobin)
    }
}

/// A host-independent thread scheduling priority: a class tag plus the
/// numeric level used by the realtime classes.
///
/// The default value (`Default` class, level 0) denotes the host's own
/// default scheduling and is always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Priority {
    /// Scheduling class.
    pub class: PriorityClass,
    /// Numeric level; meaningful only for `Fifo` and `RoundRobin`.
    #[serde(default)]
    pub level: u8,
}

impl Priority {
    /// Descriptor for a plain class with no level.
    #[must_use]
    pub const fn class(class: PriorityClass) -> Self {
        Self { class, level: 0 }
    }

    /// Descriptor for a realtime class with an explicit level.
    #[must_use]
    pub const fn realtime(class: PriorityClass, level: u8) -> Self {
        Self { class, level }
    }

    /// Whether this is the host-default descriptor.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.class == PriorityClass::Default && self.level == 0
    }

    /// Host-independent shape validation: the level must agree with the
    /// class. Host capability is checked separately when the descriptor is
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`PriorityError::InvalidLevel`] on a level/class mismatch.
    pub fn validate(&self) -> Result<(), PriorityError> {
        if self.class.is_realtime() {
            if !(1..=99).contains(&self.level) {
                return Err(PriorityError::InvalidLevel {
                    class: self.class,
                    level: self.level,
                });
            }
        } else if self.level != 0 {
            return Err(PriorityError::InvalidLevel {
                class: self.class,
                level: self.level,
            });
        }
        Ok(())
    }
}

/// Errors produced while validating or applying a priority descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityError {
    /// The class is not representable on this host.
    #[error("priority class {class:?} is not supported on this host")]
    Unsupported {
        /// The rejected class.
        class: PriorityClass,
    },
    /// The level does not agree with the class.
    #[error("level {level} is not valid for priority class {class:?}")]
    InvalidLevel {
        /// The class the level was paired with.
        class: PriorityClass,
        /// The rejected level.
        level: u8,
    },
    /// The native scheduling call failed (e.g. insufficient privilege).
    #[error("native priority call failed with code {code}")]
    Native {
        /// OS error code returned by the native call.
        code: i32,
    },
}
