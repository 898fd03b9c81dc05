/*!
 * Introspection Module
 * Per-process view through the procfs filesystem
 */

pub mod procfs;
pub mod types;

// Re-export for convenience
pub use procfs::{ProcEntry, PROC_ROOT};
pub use types::{Descriptor, IntrospectError, IntrospectResult, ProcState, StatusField};

use crate::core::types::Pid;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Status fields shown by an inspection
pub const REPORTED_FIELDS: &[&str] = &[
    "Name", "State", "PPid", "VmSize", "VmRSS", "VmPeak", "VmData", "VmSwap",
];

/// Snapshot of one process
///
/// Each section is read independently; a section that could not be read
/// carries its error and the others are still shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionReport {
    pub pid: Pid,
    pub status: IntrospectResult<Vec<StatusField>>,
    pub executable: IntrospectResult<PathBuf>,
    pub descriptors: IntrospectResult<Vec<Descriptor>>,
}

/// Inspect `/proc/<pid>`
///
/// Fails only when the entry does not exist at all.
pub fn inspect(pid: Pid) -> IntrospectResult<InspectionReport> {
    inspect_entry(&ProcEntry::open(pid)?)
}

pub(crate) fn inspect_entry(entry: &ProcEntry) -> IntrospectResult<InspectionReport> {
    let report = InspectionReport {
        pid: entry.pid(),
        status: entry.status_fields(REPORTED_FIELDS),
        executable: entry.executable(),
        descriptors: entry.descriptors(),
    };
    debug!(pid = entry.pid(), "inspected process");
    Ok(report)
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- /proc/{}/status ---", self.pid)?;
        match &self.status {
            Ok(fields) => {
                for field in fields {
                    match &field.value {
                        Some(value) => writeln!(f, "{}:\t{}", field.name, value)?,
                        None => writeln!(f, "{}:\t(not reported)", field.name)?,
                    }
                }
            }
            Err(e) => writeln!(f, "{}", e)?,
        }

        writeln!(f)?;
        writeln!(f, "--- /proc/{}/exe (executable path) ---", self.pid)?;
        match &self.executable {
            Ok(path) => writeln!(f, "{}", path.display())?,
            Err(e) => writeln!(f, "{}", e)?,
        }

        writeln!(f)?;
        writeln!(f, "--- /proc/{}/fd (open file descriptors) ---", self.pid)?;
        match &self.descriptors {
            Ok(descriptors) => {
                for d in descriptors {
                    match &d.target {
                        Some(target) => writeln!(f, "fd {} -> {}", d.fd, target.display())?,
                        None => writeln!(f, "fd {} -> (unresolved)", d.fd)?,
                    }
                }
            }
            Err(_) => writeln!(f, "No fd directory available (or insufficient permissions).")?,
        }
        Ok(())
    }
}
