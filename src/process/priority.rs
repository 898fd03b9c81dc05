/*!
 * Process Priority Hints
 * Lowering the calling process's scheduling priority through niceness
 *
 * Only increments are attempted, so the usual "raising priority needs root"
 * rule does not apply, but the kernel can still refuse. A refusal is reported
 * and never treated as fatal: priority is a hint, not a precondition.
 */

use crate::core::limits::NICE_MAX;
use crate::core::types::NiceOffset;
use nix::errno::Errno;
use nix::libc;
use std::fmt;
use tracing::{info, warn};

/// Planned niceness change for the calling process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NicePlan {
    pub current: i32,
    pub requested: i32,
    pub target: i32,
}

impl NicePlan {
    /// Plan a change of `offset` from `current`, clamped to the kernel maximum
    #[must_use]
    pub fn new(current: i32, offset: NiceOffset) -> Self {
        let requested = current.saturating_add(offset_as_nice(offset));
        Self {
            current,
            requested,
            target: requested.min(NICE_MAX).max(current),
        }
    }

    #[inline]
    #[must_use]
    pub const fn increment(&self) -> i32 {
        self.target - self.current
    }

    #[inline]
    #[must_use]
    pub const fn is_clamped(&self) -> bool {
        self.target != self.requested
    }
}

/// Offset as a signed niceness step, saturating at `i32::MAX`
#[inline]
fn offset_as_nice(offset: NiceOffset) -> i32 {
    i32::try_from(offset).unwrap_or(i32::MAX)
}

/// Outcome of a priority adjustment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NiceAdjustment {
    /// Offset was zero, or the process already sits at the maximum
    Unchanged { nice: i32 },
    /// Applied as requested
    Applied { from: i32, to: i32 },
    /// Applied, but limited to the kernel maximum
    Clamped { from: i32, to: i32, requested: i32 },
    /// Refused by the OS; the process keeps its previous niceness
    Denied { requested: i32, reason: String },
}

impl NiceAdjustment {
    #[inline]
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, NiceAdjustment::Denied { .. })
    }
}

impl fmt::Display for NiceAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NiceAdjustment::Unchanged { nice } => write!(f, "nice unchanged at {}", nice),
            NiceAdjustment::Applied { from, to } => write!(f, "nice {} -> {}", from, to),
            NiceAdjustment::Clamped {
                from,
                to,
                requested,
            } => write!(f, "nice {} -> {} (clamped from {})", from, to, requested),
            NiceAdjustment::Denied { requested, reason } => {
                write!(f, "unable to set nice {}: {}", requested, reason)
            }
        }
    }
}

/// Current niceness of the calling process
pub fn current_nice() -> Result<i32, Errno> {
    clear_errno();
    // SAFETY: plain syscall wrapper with no pointer arguments
    let nice = unsafe { libc::getpriority(libc::PRIO_PROCESS, 0) };
    // -1 is a legal niceness, so errno decides
    if nice == -1 && Errno::last_raw() != 0 {
        return Err(Errno::last());
    }
    Ok(nice)
}

#[allow(unused_unsafe)]
fn clear_errno() {
    // SAFETY: only resets the calling thread's errno
    unsafe { Errno::clear() };
}

/// Lower the calling process's priority by `offset` niceness steps
pub fn lower_priority(offset: NiceOffset) -> NiceAdjustment {
    let current = match current_nice() {
        Ok(nice) => nice,
        Err(errno) => {
            warn!(offset, error = %errno, "could not read current niceness");
            return NiceAdjustment::Denied {
                requested: offset_as_nice(offset),
                reason: errno.desc().to_string(),
            };
        }
    };

    let plan = NicePlan::new(current, offset);
    if plan.increment() == 0 {
        if plan.is_clamped() {
            info!(current, requested = plan.requested, "already at maximum niceness");
        }
        return NiceAdjustment::Unchanged { nice: current };
    }

    // SAFETY: plain syscall wrapper with no pointer arguments
    let result = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, plan.target) };
    if let Err(errno) = Errno::result(result) {
        warn!(requested = plan.requested, error = %errno, "priority change denied");
        return NiceAdjustment::Denied {
            requested: plan.requested,
            reason: errno.desc().to_string(),
        };
    }

    if plan.is_clamped() {
        info!(
            from = current,
            to = plan.target,
            requested = plan.requested,
            "niceness clamped"
        );
        NiceAdjustment::Clamped {
            from: current,
            to: plan.target,
            requested: plan.requested,
        }
    } else {
        NiceAdjustment::Applied {
            from: current,
            to: plan.target,
        }
    }
}
