//! Progress persistence layer.
//!
//! Owns the persisted profile, the name-keyed registry, and the two flat
//! append-only logs (learning events and free-text submissions). Backed by
//! sled with bincode-encoded, schema-versioned records.
//!
//! ## Merge contract
//!
//! The registry entry for a name is written by two independent callers:
//! profile sync (summary fields) and dialogue session completion (history
//! list). All writes therefore go through a *field-level* merge: summary
//! fields come from the writer, the history list is preserved verbatim
//! unless the writer is specifically appending to it. A full-object
//! overwrite from either side would erase the other's data.
//!
//! Writes are synchronous read-modify-write cycles; two independent
//! processes racing on the same store resolve last-writer-wins at the
//! granularity of one cycle. That limitation is accepted, not fixed here.

pub mod errors;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use log::debug;
use sled::IVec;

use crate::config::tuning::SESSION_HISTORY_CAP;
use errors::ProgressError;
use types::{
    DialogueSessionRecord, LearningEvent, Profile, RegistryEntry, SubmissionRecord,
    PROFILE_SCHEMA_VERSION, REGISTRY_SCHEMA_VERSION, RESERVED_ADMIN_NAME,
};

const TREE_PRIMARY: &str = "progress";
const TREE_EVENTS: &str = "progress_events";
const TREE_SUBMISSIONS: &str = "progress_submissions";

const PROFILE_KEY: &[u8] = b"profile:current";

// Process-local tiebreak so two appends within the same nanosecond cannot
// share a key and silently overwrite each other.
static APPEND_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_append_key(prefix: &str) -> Vec<u8> {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000);
    let seq = APPEND_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}:{:020}:{:06}", prefix, nanos, seq).into_bytes()
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct ProgressStoreBuilder {
    path: PathBuf,
}

impl ProgressStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<ProgressStore, ProgressError> {
        ProgressStore::open(self.path)
    }
}

/// Sled-backed persistence for profile, registry, and audit logs.
pub struct ProgressStore {
    _db: sled::Db,
    primary: sled::Tree,
    events: sled::Tree,
    submissions: sled::Tree,
}

impl ProgressStore {
    /// Open (or create) the progress store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let primary = db.open_tree(TREE_PRIMARY)?;
        let events = db.open_tree(TREE_EVENTS)?;
        let submissions = db.open_tree(TREE_SUBMISSIONS)?;
        Ok(Self {
            _db: db,
            primary,
            events,
            submissions,
        })
    }

    fn registry_key(name: &str) -> Vec<u8> {
        format!("registry:{}", name.to_lowercase()).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ProgressError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, ProgressError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Return the persisted profile, or `None` when no one has logged in yet.
    pub fn load_profile(&self) -> Result<Option<Profile>, ProgressError> {
        let Some(bytes) = self.primary.get(PROFILE_KEY)? else {
            return Ok(None);
        };
        let profile: Profile = Self::deserialize(bytes)?;
        if profile.schema_version != PROFILE_SCHEMA_VERSION {
            return Err(ProgressError::SchemaMismatch {
                entity: "profile",
                expected: PROFILE_SCHEMA_VERSION,
                found: profile.schema_version,
            });
        }
        Ok(Some(profile))
    }

    /// Persist the full profile, then sync its summary into the registry.
    pub fn save_profile(&self, profile: &Profile, avatar: &str) -> Result<(), ProgressError> {
        let mut record = profile.clone();
        record.schema_version = PROFILE_SCHEMA_VERSION;
        let bytes = Self::serialize(&record)?;
        self.primary.insert(PROFILE_KEY, bytes)?;
        self.primary.flush()?;
        self.sync_registry(profile, avatar)
    }

    /// Remove the persisted profile (logout keeps the registry intact).
    pub fn clear_profile(&self) -> Result<(), ProgressError> {
        self.primary.remove(PROFILE_KEY)?;
        self.primary.flush()?;
        Ok(())
    }

    /// Merge the profile's summary fields into its registry entry without
    /// disturbing the session history. The reserved administrative identity
    /// is never synced.
    pub fn sync_registry(&self, profile: &Profile, avatar: &str) -> Result<(), ProgressError> {
        if profile.name == RESERVED_ADMIN_NAME {
            debug!("registry sync skipped for reserved identity");
            return Ok(());
        }
        let existing = self.registry_entry(&profile.name)?;
        let merged = merge_summary(existing, profile, avatar);
        self.put_registry_entry(&merged)
    }

    /// Prepend a dialogue session record to a name's history, truncating to
    /// the retention cap. Summary fields are left untouched.
    pub fn append_session_history(
        &self,
        name: &str,
        record: DialogueSessionRecord,
    ) -> Result<(), ProgressError> {
        let mut entry = self
            .registry_entry(name)?
            .unwrap_or_else(|| RegistryEntry::new(name));
        entry.last_sessions.insert(0, record);
        entry.last_sessions.truncate(SESSION_HISTORY_CAP);
        self.put_registry_entry(&entry)
    }

    /// Fetch a registry entry by display name.
    pub fn registry_entry(&self, name: &str) -> Result<Option<RegistryEntry>, ProgressError> {
        let Some(bytes) = self.primary.get(Self::registry_key(name))? else {
            return Ok(None);
        };
        let entry: RegistryEntry = Self::deserialize(bytes)?;
        if entry.schema_version != REGISTRY_SCHEMA_VERSION {
            return Err(ProgressError::SchemaMismatch {
                entity: "registry entry",
                expected: REGISTRY_SCHEMA_VERSION,
                found: entry.schema_version,
            });
        }
        Ok(Some(entry))
    }

    /// List all registry entries (leaderboard/admin views consume this).
    pub fn registry_entries(&self) -> Result<Vec<RegistryEntry>, ProgressError> {
        let mut entries = Vec::new();
        for item in self.primary.scan_prefix(b"registry:") {
            let (_, bytes) = item?;
            entries.push(Self::deserialize(bytes)?);
        }
        Ok(entries)
    }

    fn put_registry_entry(&self, entry: &RegistryEntry) -> Result<(), ProgressError> {
        let mut record = entry.clone();
        record.schema_version = REGISTRY_SCHEMA_VERSION;
        let bytes = Self::serialize(&record)?;
        self.primary.insert(Self::registry_key(&entry.name), bytes)?;
        self.primary.flush()?;
        Ok(())
    }

    /// Append an XP delta to the flat chronological learning log.
    pub fn append_learning_event(&self, xp_delta: i32) -> Result<(), ProgressError> {
        let event = LearningEvent {
            timestamp: Utc::now(),
            xp_delta,
        };
        let bytes = Self::serialize(&event)?;
        self.events.insert(next_append_key("events"), bytes)?;
        self.events.flush()?;
        Ok(())
    }

    /// Read the full learning log in chronological order.
    pub fn learning_events(&self) -> Result<Vec<LearningEvent>, ProgressError> {
        let mut events = Vec::new();
        for item in self.events.iter() {
            let (_, bytes) = item?;
            events.push(Self::deserialize(bytes)?);
        }
        Ok(events)
    }

    /// Append a raw free-text submission for later manual review.
    pub fn append_submission(&self, record: SubmissionRecord) -> Result<(), ProgressError> {
        let bytes = Self::serialize(&record)?;
        self.submissions
            .insert(next_append_key("submissions"), bytes)?;
        self.submissions.flush()?;
        Ok(())
    }

    /// Read the full submission log in chronological order.
    pub fn submissions(&self) -> Result<Vec<SubmissionRecord>, ProgressError> {
        let mut records = Vec::new();
        for item in self.submissions.iter() {
            let (_, bytes) = item?;
            records.push(Self::deserialize(bytes)?);
        }
        Ok(records)
    }
}

/// Field-level merge of profile summary data into a registry entry.
///
/// Summary fields (`xp`, `level_label`, `store`, `avatar`) come from the
/// writer; `last_sessions` is preserved verbatim from the existing entry.
pub fn merge_summary(
    existing: Option<RegistryEntry>,
    profile: &Profile,
    avatar: &str,
) -> RegistryEntry {
    let mut entry = existing.unwrap_or_else(|| RegistryEntry::new(&profile.name));
    entry.name = profile.name.clone();
    entry.xp = profile.xp;
    entry.level_label = profile.level.label().to_string();
    entry.store = profile.store.clone();
    entry.avatar = avatar.to_string();
    entry
}
