/*!
 * Core Types
 * Common types used across the lab
 */

use nix::unistd::Pid as NixPid;

/// OS process ID
pub type Pid = u32;

/// Encoded wait status as reported by the kernel
pub type RawStatus = i32;

/// Niceness increment applied to a child (0 = unchanged)
pub type NiceOffset = u32;

/// Convert a lab PID into the nix representation
#[inline]
#[must_use]
pub fn to_nix(pid: Pid) -> NixPid {
    NixPid::from_raw(pid as i32)
}

/// Convert a nix PID into the lab representation
#[inline]
#[must_use]
pub fn from_nix(pid: NixPid) -> Pid {
    pid.as_raw() as Pid
}

/// PID of the calling process
#[inline]
#[must_use]
pub fn current_pid() -> Pid {
    from_nix(nix::unistd::getpid())
}

/// Parent PID of the calling process, as the kernel reports it right now
#[inline]
#[must_use]
pub fn current_parent_pid() -> Pid {
    from_nix(nix::unistd::getppid())
}
