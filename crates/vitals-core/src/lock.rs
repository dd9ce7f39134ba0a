//! Advisory locking for the files under `.vitals/` that are rewritten in
//! place: the mute store and the latest period state.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// How long writers wait for another `vitals` process before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("E5002: {} is held by another process (waited {waited:?})", path.display())]
    Timeout { path: PathBuf, waited: Duration },

    #[error("E5003: cannot open lock file: {0}")]
    IoError(#[from] io::Error),
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::IoError(_) => ErrorCode::StateWriteFailed,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Exclusive lock held for one read-modify-write of a state file.
///
/// Unlocked on [`StateLock::release`] or drop.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// Take the lock at `path`, creating it and its directory if needed.
    /// Retries every few milliseconds until `timeout` has passed.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        while file.try_lock_exclusive().is_err() {
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn release(self) {
        drop(self);
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn creates_vitals_dir_on_first_lock() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join(".vitals/mutes.lock");

        let lock = StateLock::acquire(&path, Duration::from_millis(50)).expect("lock");
        assert!(path.exists());
        assert_eq!(lock.path(), path.as_path());
    }

    #[test]
    fn second_writer_times_out_while_first_holds() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("state.lock");

        let _held = StateLock::acquire(&path, Duration::from_millis(50)).expect("first lock");
        let err = StateLock::acquire(&path, Duration::from_millis(30)).expect_err("contended");

        assert_eq!(err.code(), ErrorCode::LockContention);
        assert!(err.to_string().starts_with("E5002"));
        assert!(matches!(&err, LockError::Timeout { path: locked, .. } if locked == &path));
    }

    #[test]
    fn waiting_writer_proceeds_after_release() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("mutes.lock");

        let held = StateLock::acquire(&path, Duration::from_millis(50)).expect("first lock");
        let (tx, rx) = mpsc::channel();
        let waiter_path = path.clone();
        let waiter = thread::spawn(move || {
            tx.send(()).expect("signal");
            StateLock::acquire(&waiter_path, Duration::from_secs(2)).map(|lock| lock.release())
        });

        rx.recv().expect("waiter started");
        thread::sleep(Duration::from_millis(30));
        held.release();

        assert!(waiter.join().expect("waiter thread").is_ok());
    }

    #[test]
    fn io_failures_map_to_state_write_code() {
        let err = LockError::from(io::Error::other("read-only filesystem"));
        assert_eq!(err.code(), ErrorCode::StateWriteFailed);
        assert!(err.hint().is_some());
    }
}
