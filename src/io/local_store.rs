//! The local durability floor: a string key-value store plus the snapshot
//! load/save that sits on top of it.
//!
//! Reads never fail: missing or corrupt data falls back to an empty planner.
//! Writes report errors so the caller can decide to swallow them.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::model::lenient;
use crate::model::project::Project;
use crate::model::state::{PlannerState, Snapshot};

pub const KEY_PROJECTS: &str = "pm:projects:v1";
pub const KEY_ACTIVE: &str = "pm:activeIndex:v1";
pub const KEY_UPDATED: &str = "pm:updatedAt";

/// File name of the store inside the data directory
pub const STORE_FILE: &str = "store.json";

/// Error type for local store writes
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize store: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("store is read-only")]
    ReadOnly,
}

/// A durable string key-value store
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, like a full browser quota.
    pub fn read_only(entries: HashMap<String, String>) -> Self {
        MemoryKv {
            entries,
            read_only: true,
        }
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// All keys in one JSON object file, rewritten atomically on every set.
#[derive(Debug)]
pub struct FileKv {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl FileKv {
    /// Open (or start) the store in `data_dir`. A corrupt file is ignored
    /// and will be replaced by the next write.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(STORE_FILE);
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt local store");
                IndexMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => IndexMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read local store");
                IndexMap::new()
            }
        };
        FileKv { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        let content = serde_json::to_vec_pretty(&self.entries)?;
        atomic_write(&self.path, &content).map_err(|source| StoreError::WriteError {
            path: self.path.clone(),
            source,
        })
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Snapshot load / save
// ---------------------------------------------------------------------------

/// Read the local snapshot. Any unparseable value discards the whole
/// snapshot in favour of an empty one.
pub fn load_local(kv: &dyn KvStore) -> Snapshot {
    match try_load_local(kv) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(error = %e, "local snapshot unreadable, starting empty");
            Snapshot::default()
        }
    }
}

fn try_load_local(kv: &dyn KvStore) -> Result<Snapshot, serde_json::Error> {
    let projects: Vec<Project> = match kv.get(KEY_PROJECTS) {
        Some(raw) => lenient::objects(serde_json::from_str::<Value>(&raw)?),
        None => Vec::new(),
    };
    let active = match kv.get(KEY_ACTIVE) {
        Some(raw) => serde_json::from_str::<Value>(&raw)?
            .as_u64()
            .and_then(|i| usize::try_from(i).ok()),
        None => None,
    };
    let updated_at = kv
        .get(KEY_UPDATED)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|t| t.timestamp_millis())
        .unwrap_or(0);
    Ok(Snapshot::new(PlannerState::new(projects, active), updated_at))
}

/// Write the state and stamp it with `now`.
pub fn save_local(kv: &mut dyn KvStore, state: &PlannerState, now: DateTime<Utc>) -> Result<(), StoreError> {
    kv.set(KEY_PROJECTS, serde_json::to_string(&state.projects)?)?;
    let active = state.active.map_or(-1, |i| i as i64);
    kv.set(KEY_ACTIVE, active.to_string())?;
    kv.set(KEY_UPDATED, now.to_rfc3339_opts(SecondsFormat::Millis, true))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::project_ops::add_project;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_state() -> PlannerState {
        let mut state = PlannerState::default();
        add_project(&mut state, "Comics").unwrap();
        add_project(&mut state, "Zines").unwrap();
        state.active = Some(1);
        state
    }

    #[test]
    fn empty_store_loads_empty_snapshot() {
        let kv = MemoryKv::new();
        assert_eq!(load_local(&kv), Snapshot::default());
        assert_eq!(load_local(&kv).state.active, None);
    }

    #[test]
    fn save_then_load_round_trip() {
        let mut kv = MemoryKv::new();
        let state = sample_state();
        let now = Utc.with_ymd_and_hms(2025, 8, 20, 9, 30, 0).unwrap();
        save_local(&mut kv, &state, now).unwrap();

        assert_eq!(kv.get(KEY_ACTIVE).as_deref(), Some("1"));
        assert_eq!(kv.get(KEY_UPDATED).as_deref(), Some("2025-08-20T09:30:00.000Z"));

        let snap = load_local(&kv);
        assert_eq!(snap.state, state);
        assert_eq!(snap.updated_at, now.timestamp_millis());
    }

    #[test]
    fn no_selection_is_stored_as_minus_one() {
        let mut kv = MemoryKv::new();
        save_local(&mut kv, &PlannerState::default(), Utc::now()).unwrap();
        assert_eq!(kv.get(KEY_ACTIVE).as_deref(), Some("-1"));
        assert_eq!(load_local(&kv).state.active, None);
    }

    #[test]
    fn corrupt_json_falls_back_to_empty() {
        let mut kv = MemoryKv::new();
        save_local(&mut kv, &sample_state(), Utc::now()).unwrap();
        kv.set(KEY_PROJECTS, "[{oops".into()).unwrap();
        assert_eq!(load_local(&kv), Snapshot::default());
    }

    #[test]
    fn bad_timestamp_reads_as_zero() {
        let mut kv = MemoryKv::new();
        kv.set(KEY_PROJECTS, "[]".into()).unwrap();
        kv.set(KEY_UPDATED, "yesterday".into()).unwrap();
        assert_eq!(load_local(&kv).updated_at, 0);
    }

    #[test]
    fn dangling_active_index_is_dropped() {
        let mut kv = MemoryKv::new();
        kv.set(KEY_PROJECTS, r#"[{"name": "a"}]"#.into()).unwrap();
        kv.set(KEY_ACTIVE, "5".into()).unwrap();
        assert_eq!(load_local(&kv).state.active, None);
    }

    #[test]
    fn read_only_store_reports_write_failure() {
        let mut kv = MemoryKv::read_only(HashMap::new());
        assert!(matches!(
            save_local(&mut kv, &sample_state(), Utc::now()),
            Err(StoreError::ReadOnly)
        ));
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 8, 20, 9, 30, 0).unwrap();
        let state = sample_state();
        {
            let mut kv = FileKv::open(dir.path());
            save_local(&mut kv, &state, now).unwrap();
        }
        let kv = FileKv::open(dir.path());
        let snap = load_local(&kv);
        assert_eq!(snap.state, state);
        assert_eq!(snap.updated_at, now.timestamp_millis());
    }

    #[test]
    fn file_store_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let mut kv = FileKv::open(dir.path());
        save_local(&mut kv, &sample_state(), Utc::now()).unwrap();
        let text = fs::read_to_string(kv.path()).unwrap();
        let p = text.find(KEY_PROJECTS).unwrap();
        let a = text.find(KEY_ACTIVE).unwrap();
        let u = text.find(KEY_UPDATED).unwrap();
        assert!(p < a && a < u);
    }

    #[test]
    fn corrupt_store_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STORE_FILE), "not json {{{").unwrap();
        let kv = FileKv::open(dir.path());
        assert_eq!(load_local(&kv), Snapshot::default());
    }
}
