/*!
 * Reaper
 * Blocking collection of child exit statuses
 *
 * Collecting a status is what moves a terminated child out of the zombie
 * state. Records come back in the order the children terminated, which is
 * not the order they were created.
 */

use super::types::{ExitRecord, ProcessError, ProcessHandle, ProcessResult};
use crate::core::types::{to_nix, Pid};
use nix::errno::Errno;
use nix::sys::wait::{wait, waitid, waitpid, Id, WaitPidFlag};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Child status collector
pub struct Reaper;

impl Reaper {
    /// Collect one status per handle, in termination-arrival order
    ///
    /// Each step blocks until any child of the caller terminates. Children that
    /// are not in `handles` are collected and logged but not returned. Handles
    /// the OS no longer knows about are reported as no-such-child and skipped.
    #[instrument(skip_all, fields(expected = handles.len()))]
    pub fn reap_all(handles: &[ProcessHandle]) -> Vec<ExitRecord> {
        let mut outstanding: HashSet<Pid> = handles.iter().map(|h| h.pid).collect();
        let mut records = Vec::with_capacity(outstanding.len());

        while !outstanding.is_empty() {
            match wait() {
                Ok(status) => {
                    let Some(record) = ExitRecord::from_wait_status(status) else {
                        continue;
                    };
                    if outstanding.remove(&record.pid) {
                        debug!(pid = record.pid, status = record.raw_status, "reaped child");
                        records.push(record);
                    } else {
                        warn!(pid = record.pid, "reaped a child that was not in the batch");
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => {
                    for pid in outstanding.drain() {
                        warn!(error = %ProcessError::NoSuchChild(pid), "child missing at reap time");
                    }
                }
                Err(errno) => {
                    warn!(
                        error = %ProcessError::WaitFailed(errno.desc().to_string()),
                        remaining = outstanding.len(),
                        "stopping collection"
                    );
                    break;
                }
            }
        }

        info!(collected = records.len(), "batch reaped");
        records
    }

    /// Block until the given child terminates and collect its status
    pub fn reap_one(handle: &ProcessHandle) -> ProcessResult<ExitRecord> {
        loop {
            match waitpid(to_nix(handle.pid), None) {
                Ok(status) => {
                    if let Some(record) = ExitRecord::from_wait_status(status) {
                        debug!(pid = record.pid, status = record.raw_status, "reaped child");
                        return Ok(record);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => return Err(ProcessError::NoSuchChild(handle.pid)),
                Err(errno) => return Err(ProcessError::WaitFailed(errno.desc().to_string())),
            }
        }
    }

    /// Block until the given child terminates without collecting its status
    ///
    /// On return the child is a zombie and stays one until reaped.
    pub fn await_exit(handle: &ProcessHandle) -> ProcessResult<()> {
        loop {
            match waitid(
                Id::Pid(to_nix(handle.pid)),
                WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT,
            ) {
                Ok(_) => return Ok(()),
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => return Err(ProcessError::NoSuchChild(handle.pid)),
                Err(errno) => return Err(ProcessError::WaitFailed(errno.desc().to_string())),
            }
        }
    }
}
