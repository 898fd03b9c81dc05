/*!
 * Result Channel
 *
 * Cross-process result exchange through the filesystem. Duplicated processes
 * share no mutable memory, so each writer leaves one record named after its
 * own PID and the reader collects it after reaping the writer.
 *
 * Layout: `<base>/run-<uuid>/child_<pid>.json`. The per-run directory keeps
 * concurrent runs apart; the PID keeps siblings apart, so no locking is needed.
 * A record is written to a temporary name and renamed into place, so a reader
 * never sees a partially written record under its final name.
 */

use super::types::{ChannelError, ChannelResult};
use crate::core::limits::{RECORD_EXTENSION, RECORD_PREFIX};
use crate::core::types::Pid;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Filesystem-backed mailbox of records of type `T`, keyed by owner PID
#[derive(Debug)]
pub struct ResultChannel<T> {
    dir: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for ResultChannel<T> {
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> ResultChannel<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a fresh per-run directory under `base`
    pub fn create(base: &Path) -> ChannelResult<Self> {
        let dir = base.join(format!("run-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).map_err(|e| ChannelError::io(&dir, e))?;
        debug!(dir = %dir.display(), "result channel created");
        Ok(Self::open(dir))
    }

    /// Use an existing directory as the channel
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _record: PhantomData,
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final location of `owner`'s record
    pub fn record_path(&self, owner: Pid) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", RECORD_PREFIX, owner, RECORD_EXTENSION))
    }

    /// Persist `entry` as `owner`'s record
    pub fn write(&self, owner: Pid, entry: &T) -> ChannelResult<()> {
        let mut bytes = serde_json::to_vec(entry).map_err(|e| ChannelError::Serialization {
            owner,
            reason: e.to_string(),
        })?;
        bytes.push(b'\n');

        let path = self.record_path(owner);
        let staging = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));
        fs::write(&staging, &bytes).map_err(|e| ChannelError::io(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| ChannelError::io(&path, e))?;

        debug!(owner, path = %path.display(), "record written");
        Ok(())
    }

    /// Take `owner`'s record: return it and remove it from disk
    ///
    /// `Ok(None)` when the owner never wrote. A record that cannot be parsed is
    /// removed as well and reported as `Malformed`.
    pub fn read_and_delete(&self, owner: Pid) -> ChannelResult<Option<T>> {
        let path = self.record_path(owner);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ChannelError::io(&path, e)),
        };

        if let Err(e) = fs::remove_file(&path) {
            warn!(owner, error = %e, "could not remove record");
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ChannelError::Malformed {
                owner,
                reason: e.to_string(),
            })
    }

    /// Owners whose records are still on disk, sorted
    pub fn pending_owners(&self) -> ChannelResult<Vec<Pid>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ChannelError::io(&self.dir, e)),
        };

        let mut owners: Vec<Pid> = entries
            .flatten()
            .filter_map(|entry| parse_owner(&entry.file_name().to_string_lossy()))
            .collect();
        owners.sort_unstable();
        Ok(owners)
    }

    /// Remove the run directory if nothing is left in it
    ///
    /// Leftover records are logged and kept for inspection.
    pub fn cleanup(&self) -> ChannelResult<()> {
        let leftover = self.pending_owners()?;
        if !leftover.is_empty() {
            warn!(owners = ?leftover, dir = %self.dir.display(), "unread records left behind");
            return Ok(());
        }

        match fs::remove_dir(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ChannelError::io(&self.dir, e)),
        }
    }
}

fn parse_owner(file_name: &str) -> Option<Pid> {
    file_name
        .strip_prefix(RECORD_PREFIX)?
        .strip_suffix(RECORD_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::types::ExperimentEntry;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::TempDir;

    fn channel() -> (TempDir, ResultChannel<ExperimentEntry>) {
        let temp = TempDir::new().unwrap();
        let channel = ResultChannel::create(temp.path()).unwrap();
        (temp, channel)
    }

    #[test]
    fn test_record_path_derived_from_owner() {
        let (_temp, channel) = channel();
        let path = channel.record_path(4242);
        assert_eq!(path.file_name().unwrap(), "child_4242.json");
        assert!(path.starts_with(channel.dir()));
    }

    #[test]
    fn test_write_then_take() {
        let (_temp, channel) = channel();
        let entry = ExperimentEntry::new(10, 5, Duration::from_millis(1500));

        channel.write(10, &entry).unwrap();
        assert!(channel.record_path(10).exists());

        let read = channel.read_and_delete(10).unwrap();
        assert_eq!(read, Some(entry));
        assert!(!channel.record_path(10).exists());

        // Taken exactly once
        assert_eq!(channel.read_and_delete(10).unwrap(), None);
    }

    #[test]
    fn test_missing_record_is_absent() {
        let (_temp, channel) = channel();
        assert_eq!(channel.read_and_delete(999).unwrap(), None);
    }

    #[test]
    fn test_malformed_record_reported_and_removed() {
        let (_temp, channel) = channel();
        fs::write(channel.record_path(7), b"7,0,not-json").unwrap();

        let err = channel.read_and_delete(7).unwrap_err();
        assert!(matches!(err, ChannelError::Malformed { owner: 7, .. }));
        assert!(!channel.record_path(7).exists());
    }

    #[test]
    fn test_pending_owners_and_cleanup() {
        let (_temp, channel) = channel();
        channel.write(30, &ExperimentEntry::new(30, 0, Duration::ZERO)).unwrap();
        channel.write(4, &ExperimentEntry::new(4, 5, Duration::ZERO)).unwrap();
        fs::write(channel.dir().join("unrelated.txt"), b"x").unwrap();

        assert_eq!(channel.pending_owners().unwrap(), vec![4, 30]);

        // Records left: directory stays
        channel.cleanup().unwrap();
        assert!(channel.dir().exists());

        channel.read_and_delete(4).unwrap();
        channel.read_and_delete(30).unwrap();
        fs::remove_file(channel.dir().join("unrelated.txt")).unwrap();
        channel.cleanup().unwrap();
        assert!(!channel.dir().exists());
    }

    #[test]
    fn test_runs_get_distinct_directories() {
        let temp = TempDir::new().unwrap();
        let a = ResultChannel::<ExperimentEntry>::create(temp.path()).unwrap();
        let b = ResultChannel::<ExperimentEntry>::create(temp.path()).unwrap();
        assert_ne!(a.dir(), b.dir());
    }

    #[test]
    fn test_parse_owner() {
        assert_eq!(parse_owner("child_123.json"), Some(123));
        assert_eq!(parse_owner("child_123.json.tmp"), None);
        assert_eq!(parse_owner("other_1.json"), None);
    }
}
