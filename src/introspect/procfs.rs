/*!
 * Procfs Reader
 *
 * Read-only view of one `/proc/<pid>` entry. The root is configurable so the
 * parsing can run against a fabricated tree.
 */

use super::types::{Descriptor, IntrospectError, IntrospectResult, ProcState, StatusField};
use crate::core::types::Pid;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default procfs mount point
pub const PROC_ROOT: &str = "/proc";

/// Handle to `<root>/<pid>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcEntry {
    root: PathBuf,
    pid: Pid,
}

impl ProcEntry {
    /// Open `/proc/<pid>`, failing when the entry does not exist
    pub fn open(pid: Pid) -> IntrospectResult<Self> {
        Self::with_root(PROC_ROOT, pid)
    }

    /// Open `<root>/<pid>`
    pub fn with_root(root: impl Into<PathBuf>, pid: Pid) -> IntrospectResult<Self> {
        let entry = Self {
            root: root.into(),
            pid,
        };
        if entry.dir().is_dir() {
            Ok(entry)
        } else {
            Err(IntrospectError::NotFound(pid))
        }
    }

    /// Whether `/proc/<pid>` currently exists
    pub fn exists(pid: Pid) -> bool {
        Path::new(PROC_ROOT).join(pid.to_string()).is_dir()
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(self.pid.to_string())
    }

    fn read_status(&self) -> IntrospectResult<String> {
        let path = self.dir().join("status");
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => IntrospectError::NotFound(self.pid),
            _ => IntrospectError::io(path, e),
        })
    }

    /// The requested status fields, in the requested order
    pub fn status_fields(&self, names: &[&str]) -> IntrospectResult<Vec<StatusField>> {
        let status = self.read_status()?;
        Ok(names
            .iter()
            .map(|name| StatusField {
                name: (*name).to_string(),
                value: lookup(&status, name).map(str::to_string),
            })
            .collect())
    }

    fn field(&self, name: &str) -> IntrospectResult<String> {
        let status = self.read_status()?;
        lookup(&status, name)
            .map(str::to_string)
            .ok_or_else(|| IntrospectError::MissingField {
                pid: self.pid,
                field: name.to_string(),
            })
    }

    /// Current scheduler state
    pub fn state(&self) -> IntrospectResult<ProcState> {
        let value = self.field("State")?;
        value
            .chars()
            .next()
            .map(ProcState::from_code)
            .ok_or_else(|| IntrospectError::MalformedField {
                pid: self.pid,
                field: "State".to_string(),
                value,
            })
    }

    /// Parent id as the kernel reports it now
    pub fn parent_pid(&self) -> IntrospectResult<Pid> {
        let value = self.field("PPid")?;
        value
            .parse()
            .map_err(|_| IntrospectError::MalformedField {
                pid: self.pid,
                field: "PPid".to_string(),
                value,
            })
    }

    /// Resolved target of the `exe` link
    pub fn executable(&self) -> IntrospectResult<PathBuf> {
        let path = self.dir().join("exe");
        fs::read_link(&path).map_err(|e| IntrospectError::io(path, e))
    }

    /// Open descriptors sorted by number, each with its resolved target
    pub fn descriptors(&self) -> IntrospectResult<Vec<Descriptor>> {
        let dir = self.dir().join("fd");
        let entries = fs::read_dir(&dir).map_err(|e| IntrospectError::io(&dir, e))?;

        let mut descriptors: Vec<Descriptor> = entries
            .flatten()
            .filter_map(|entry| {
                let fd = entry.file_name().to_str()?.parse::<u32>().ok()?;
                Some(Descriptor {
                    fd,
                    target: fs::read_link(entry.path()).ok(),
                })
            })
            .collect();
        descriptors.sort_by_key(|d| d.fd);
        Ok(descriptors)
    }
}

/// Value of `name:` in a status file, whitespace-trimmed
fn lookup<'a>(status: &'a str, name: &str) -> Option<&'a str> {
    status.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key == name).then(|| value.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const ZOMBIE_STATUS: &str = "Name:\tsleepy\n\
        Umask:\t0022\n\
        State:\tZ (zombie)\n\
        Tgid:\t4321\n\
        Pid:\t4321\n\
        PPid:\t1234\n";

    fn fake_proc(pid: Pid, status: &str) -> TempDir {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(pid.to_string());
        fs::create_dir_all(dir.join("fd")).unwrap();
        fs::write(dir.join("status"), status).unwrap();
        root
    }

    #[test]
    fn test_missing_entry() {
        let root = TempDir::new().unwrap();
        assert_eq!(
            ProcEntry::with_root(root.path(), 77).unwrap_err(),
            IntrospectError::NotFound(77)
        );
    }

    #[test]
    fn test_fake_zombie_entry() {
        let root = fake_proc(4321, ZOMBIE_STATUS);
        let entry = ProcEntry::with_root(root.path(), 4321).unwrap();

        assert_eq!(entry.state().unwrap(), ProcState::Zombie);
        assert_eq!(entry.parent_pid().unwrap(), 1234);
    }

    #[test]
    fn test_status_fields_report_absent_values() {
        let root = fake_proc(4321, ZOMBIE_STATUS);
        let entry = ProcEntry::with_root(root.path(), 4321).unwrap();

        let fields = entry.status_fields(&["Name", "VmRSS"]).unwrap();
        assert_eq!(
            fields,
            vec![
                StatusField {
                    name: "Name".to_string(),
                    value: Some("sleepy".to_string()),
                },
                StatusField {
                    name: "VmRSS".to_string(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn test_malformed_ppid() {
        let root = fake_proc(5, "State:\tS (sleeping)\nPPid:\tnope\n");
        let entry = ProcEntry::with_root(root.path(), 5).unwrap();
        assert!(matches!(
            entry.parent_pid().unwrap_err(),
            IntrospectError::MalformedField { pid: 5, .. }
        ));
    }

    #[test]
    fn test_descriptors_sorted_numerically() {
        let root = fake_proc(9, ZOMBIE_STATUS);
        let fd_dir = root.path().join("9").join("fd");
        for (fd, target) in [("10", "/tmp/ten"), ("2", "/dev/null"), ("1", "/dev/pts/0")] {
            std::os::unix::fs::symlink(target, fd_dir.join(fd)).unwrap();
        }

        let entry = ProcEntry::with_root(root.path(), 9).unwrap();
        let fds: Vec<u32> = entry.descriptors().unwrap().iter().map(|d| d.fd).collect();
        assert_eq!(fds, vec![1, 2, 10]);
        assert_eq!(
            entry.descriptors().unwrap()[2].target,
            Some(PathBuf::from("/tmp/ten"))
        );
    }

    #[test]
    fn test_live_own_entry() {
        let pid = std::process::id();
        assert!(ProcEntry::exists(pid));

        let entry = ProcEntry::open(pid).unwrap();
        assert_eq!(entry.parent_pid().unwrap(), nix::unistd::getppid().as_raw() as Pid);
        assert!(entry.executable().unwrap().is_absolute());
        assert!(!entry.descriptors().unwrap().is_empty());
    }

    #[test]
    fn test_lookup_exact_key() {
        let status = "VmSize:\t100 kB\nVm:\tx\n";
        assert_eq!(lookup(status, "VmSize"), Some("100 kB"));
        assert_eq!(lookup(status, "Vm"), Some("x"));
        assert_eq!(lookup(status, "VmRSS"), None);
    }
}
