//! Time-bounded suppression of insight categories.
//!
//! A mute lasts [`MUTE_TTL_DAYS`] days. Expired entries stay in the map
//! until the same type is muted again, at which point the timestamp is
//! refreshed. Muting is one-directional: there is no unmute, and a mute
//! request always leaves the type muted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::vitals_dir;
use crate::error::ErrorCode;
use crate::lock::{DEFAULT_LOCK_TIMEOUT, LockError, StateLock};

/// How many days a mute suppresses its category.
pub const MUTE_TTL_DAYS: i64 = 7;

/// Mute lifetime as a duration.
#[must_use]
pub fn mute_ttl() -> Duration {
    Duration::days(MUTE_TTL_DAYS)
}

/// What a [`MuteRegistry::mute`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuteOutcome {
    Added,
    Refreshed,
    AlreadyMuted,
}

impl MuteOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Refreshed => "refreshed",
            Self::AlreadyMuted => "already_muted",
        }
    }

    /// The stored map changed and needs to be written back.
    #[must_use]
    pub const fn is_write(self) -> bool {
        !matches!(self, Self::AlreadyMuted)
    }
}

/// `type -> muted_at` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MuteRegistry {
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl MuteRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Types whose mute was recorded less than [`mute_ttl`] before `now`.
    #[must_use]
    pub fn active_mutes(&self, now: DateTime<Utc>) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|(_, muted_at)| is_live(**muted_at, now))
            .map(|(kind, _)| kind.clone())
            .collect()
    }

    #[must_use]
    pub fn is_muted(&self, kind: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .get(kind)
            .is_some_and(|muted_at| is_live(*muted_at, now))
    }

    /// Mute `kind` as of `now`.
    ///
    /// A live mute is left untouched; an expired one is replaced with a
    /// fresh entry at `now`; an unknown type is added.
    pub fn mute(&mut self, kind: &str, now: DateTime<Utc>) -> MuteOutcome {
        match self.entries.get(kind) {
            Some(muted_at) if is_live(*muted_at, now) => MuteOutcome::AlreadyMuted,
            Some(_) => {
                self.entries.remove(kind);
                self.entries.insert(kind.to_string(), now);
                MuteOutcome::Refreshed
            }
            None => {
                self.entries.insert(kind.to_string(), now);
                MuteOutcome::Added
            }
        }
    }

    #[must_use]
    pub fn muted_at(&self, kind: &str) -> Option<DateTime<Utc>> {
        self.entries.get(kind).copied()
    }

    /// When the mute on `kind` stops suppressing, if one was ever recorded.
    #[must_use]
    pub fn expires_at(&self, kind: &str) -> Option<DateTime<Utc>> {
        self.muted_at(kind).map(|muted_at| muted_at + mute_ttl())
    }

    /// All stored entries, expired ones included.
    pub fn entries(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.entries
            .iter()
            .map(|(kind, muted_at)| (kind.as_str(), *muted_at))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_live(muted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(muted_at) < mute_ttl()
}

#[derive(Debug, thiserror::Error)]
pub enum MuteStoreError {
    #[error("failed to read mute store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("mute store {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write mute store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl MuteStoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Corrupt { .. } => ErrorCode::MuteStoreCorrupt,
            Self::Write { .. } => ErrorCode::MuteStoreWriteFailed,
            Self::Lock(err) => err.code(),
        }
    }
}

/// The mute registry persisted as `.vitals/mutes.json`.
///
/// Every mutation is an atomic read-modify-write of the whole map under an
/// exclusive advisory lock on `.vitals/mutes.lock`.
#[derive(Debug, Clone)]
pub struct MuteStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl MuteStore {
    #[must_use]
    pub fn new(project_root: &Path) -> Self {
        let dir = vitals_dir(project_root);
        Self {
            path: dir.join("mutes.json"),
            lock_path: dir.join("mutes.lock"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current registry. A missing file is an empty registry.
    pub fn load(&self) -> Result<MuteRegistry, MuteStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(MuteRegistry::default());
            }
            Err(source) => {
                return Err(MuteStoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(MuteRegistry::default());
        }

        serde_json::from_slice(&bytes).map_err(|source| MuteStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Mute `kind` at `now` and persist the result.
    pub fn mute(&self, kind: &str, now: DateTime<Utc>) -> Result<MuteOutcome, MuteStoreError> {
        let lock = StateLock::acquire(&self.lock_path, DEFAULT_LOCK_TIMEOUT)?;

        let mut registry = self.load()?;
        let outcome = registry.mute(kind, now);
        if outcome.is_write() {
            self.save(&registry)?;
            info!(kind, outcome = outcome.as_str(), "mute recorded");
        } else {
            debug!(kind, "mute already active");
        }

        lock.release();
        Ok(outcome)
    }

    fn save(&self, registry: &MuteRegistry) -> Result<(), MuteStoreError> {
        let write_err = |source| MuteStoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let body = serde_json::to_vec_pretty(registry)
            .map_err(|err| write_err(io::Error::other(err)))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, body).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)
    }
}
