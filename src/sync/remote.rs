//! The per-user cloud document and the identity that keys it.
//!
//! Both are opaque collaborators: the planner only needs "is somebody signed
//! in, and who", plus read and merge-write of one document per user.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::io::local_store::atomic_write;
use crate::model::lenient;
use crate::model::project::Project;
use crate::model::state::{PlannerState, RemoteSnapshot};
use crate::util::clock::Clock;

/// Error type for remote document I/O
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    #[error("could not access {path}: {source}")]
    IoError { path: PathBuf, source: io::Error },
    #[error("could not encode remote document: {0}")]
    EncodeError(#[from] serde_json::Error),
}

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, once sign-in has settled. `None` means anonymous.
    async fn identity(&self) -> Option<Identity>;
}

/// An identity fixed up front (from config or flags).
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub Option<Identity>);

impl StaticIdentity {
    pub fn signed_in(uid: &str, display_name: &str) -> Self {
        StaticIdentity(Some(Identity {
            uid: uid.to_string(),
            display_name: display_name.to_string(),
        }))
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}

/// Never signs anybody in; keeps the planner local-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl IdentityProvider for Anonymous {
    async fn identity(&self) -> Option<Identity> {
        None
    }
}

/// The fields the planner writes. The store adds `updatedAt` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteWrite {
    pub projects: Vec<Project>,
    #[serde(rename = "activeIndex", with = "lenient::active_index")]
    pub active: Option<usize>,
}

impl From<&PlannerState> for RemoteWrite {
    fn from(state: &PlannerState) -> Self {
        RemoteWrite {
            projects: state.projects.clone(),
            active: state.active,
        }
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the user's document; `None` if it does not exist.
    async fn load(&self, uid: &str) -> Result<Option<RemoteSnapshot>, SyncError>;

    /// Merge `doc` into the user's document and stamp `updatedAt` with the
    /// store's own clock.
    async fn save(&self, uid: &str, doc: &RemoteWrite) -> Result<(), SyncError>;
}

/// Overlay the written fields onto an existing document.
pub fn merge_document(
    existing: &mut Map<String, Value>,
    doc: &RemoteWrite,
    updated_at: i64,
) -> Result<(), SyncError> {
    if let Value::Object(fields) = serde_json::to_value(doc)? {
        existing.extend(fields);
    }
    existing.insert("updatedAt".to_string(), Value::from(updated_at));
    Ok(())
}

fn decode_document(doc: Map<String, Value>) -> RemoteSnapshot {
    // Every field decodes leniently, so an object always yields a snapshot
    serde_json::from_value(Value::Object(doc)).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Shared in-process document store with a switchable outage and write
/// latency, for tests and local simulations.
pub struct MemoryRemote {
    docs: Mutex<HashMap<String, Map<String, Value>>>,
    clock: Arc<dyn Clock>,
    offline: AtomicBool,
    write_delay: Mutex<Duration>,
    write_attempts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryRemote {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryRemote {
            docs: Mutex::new(HashMap::new()),
            clock,
            offline: AtomicBool::new(false),
            write_delay: Mutex::new(Duration::ZERO),
            write_attempts: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Seed a user's document verbatim (timestamp included).
    pub fn insert(&self, uid: &str, snapshot: &RemoteSnapshot) {
        let doc = match serde_json::to_value(snapshot) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        self.lock_docs().insert(uid.to_string(), doc);
    }

    pub fn document(&self, uid: &str) -> Option<RemoteSnapshot> {
        self.lock_docs().get(uid).cloned().map(decode_document)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Highest number of writes observed running at the same time
    pub fn max_concurrent_writes(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock_docs(&self) -> std::sync::MutexGuard<'_, HashMap<String, Map<String, Value>>> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn load(&self, uid: &str) -> Result<Option<RemoteSnapshot>, SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Unavailable("offline".into()));
        }
        Ok(self.document(uid))
    }

    async fn save(&self, uid: &str, doc: &RemoteWrite) -> Result<(), SyncError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.write_delay.lock().unwrap_or_else(|e| e.into_inner());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = if self.offline.load(Ordering::SeqCst) {
            Err(SyncError::Unavailable("offline".into()))
        } else {
            let mut docs = self.lock_docs();
            let entry = docs.entry(uid.to_string()).or_default();
            merge_document(entry, doc, self.clock.now_ms())
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// One JSON document per user under a directory.
#[derive(Clone)]
pub struct FileRemote {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileRemote {
    pub fn new(dir: &Path, clock: Arc<dyn Clock>) -> Self {
        FileRemote {
            dir: dir.to_path_buf(),
            clock,
        }
    }

    /// Document path for a user. Bytes outside `[A-Za-z0-9_-]` are
    /// percent-encoded, so distinct uids never share a file.
    pub fn document_path(&self, uid: &str) -> PathBuf {
        let mut safe = String::with_capacity(uid.len());
        for b in uid.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                safe.push(b as char);
            } else {
                safe.push_str(&format!("%{b:02X}"));
            }
        }
        self.dir.join(format!("{safe}.json"))
    }
}

fn read_document(path: &Path) -> Result<Option<Map<String, Value>>, SyncError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SyncError::IoError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        _ => {
            tracing::warn!(path = %path.display(), "remote document is not a JSON object");
            Ok(Some(Map::new()))
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> SyncError {
    SyncError::Unavailable(e.to_string())
}

#[async_trait]
impl RemoteStore for FileRemote {
    async fn load(&self, uid: &str) -> Result<Option<RemoteSnapshot>, SyncError> {
        let path = self.document_path(uid);
        let doc = tokio::task::spawn_blocking(move || read_document(&path))
            .await
            .map_err(join_error)??;
        Ok(doc.map(decode_document))
    }

    async fn save(&self, uid: &str, doc: &RemoteWrite) -> Result<(), SyncError> {
        let path = self.document_path(uid);
        let doc = doc.clone();
        let updated_at = self.clock.now_ms();
        tokio::task::spawn_blocking(move || {
            let mut existing = read_document(&path)?.unwrap_or_default();
            merge_document(&mut existing, &doc, updated_at)?;
            let content = serde_json::to_vec_pretty(&existing)?;
            atomic_write(&path, &content).map_err(|source| SyncError::IoError {
                path: path.clone(),
                source,
            })
        })
        .await
        .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::clock::ManualClock;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_of(names: &[&str], active: Option<usize>) -> RemoteWrite {
        RemoteWrite {
            projects: names
                .iter()
                .enumerate()
                .map(|(i, n)| Project::new(n.to_string(), i))
                .collect(),
            active,
        }
    }

    #[test]
    fn merge_keeps_unknown_fields_and_stamps_time() {
        let mut existing = Map::new();
        existing.insert("theme".into(), Value::from("dark"));
        existing.insert("activeIndex".into(), Value::from(3));
        merge_document(&mut existing, &write_of(&["a"], None), 1234).unwrap();
        assert_eq!(existing["theme"], "dark");
        assert_eq!(existing["activeIndex"], -1);
        assert_eq!(existing["updatedAt"], 1234);
        assert_eq!(existing["projects"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn static_identity() {
        let who = StaticIdentity::signed_in("u1", "Mina").identity().await.unwrap();
        assert_eq!(who.uid, "u1");
        assert_eq!(Anonymous.identity().await, None);
    }

    #[tokio::test]
    async fn memory_remote_stamps_server_time() {
        let clock = Arc::new(ManualClock::at_ms(10_000));
        let remote = MemoryRemote::new(clock.clone());
        assert_eq!(remote.load("u1").await.unwrap(), None);

        remote.save("u1", &write_of(&["a", "b"], Some(1))).await.unwrap();
        clock.advance(TimeDelta::milliseconds(5));
        let doc = remote.load("u1").await.unwrap().unwrap();
        assert_eq!(doc.updated_at, Some(10_000));
        assert_eq!(doc.active, Some(1));
        assert_eq!(doc.projects.len(), 2);
    }

    #[tokio::test]
    async fn memory_remote_offline() {
        let remote = MemoryRemote::new(Arc::new(ManualClock::at_ms(0)));
        remote.set_offline(true);
        assert!(remote.load("u1").await.is_err());
        assert!(remote.save("u1", &write_of(&[], None)).await.is_err());
        assert_eq!(remote.write_attempts(), 1);
        remote.set_offline(false);
        assert_eq!(remote.load("u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_remote_keeps_similar_uids_apart() {
        let dir = TempDir::new().unwrap();
        let remote = FileRemote::new(dir.path(), Arc::new(ManualClock::at_ms(7)));
        assert_ne!(remote.document_path("a.b"), remote.document_path("a_b"));
        assert_ne!(remote.document_path("a b"), remote.document_path("a_b"));

        remote.save("a.b", &write_of(&["dotted"], Some(0))).await.unwrap();
        assert_eq!(remote.load("a_b").await.unwrap(), None);
        let doc = remote.load("a.b").await.unwrap().unwrap();
        assert_eq!(doc.projects[0].name, "dotted");
    }

    #[tokio::test]
    async fn file_remote_round_trip_and_merge() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::at_ms(42));
        let remote = FileRemote::new(dir.path(), clock.clone());
        assert_eq!(remote.load("user@example.com").await.unwrap(), None);

        let path = remote.document_path("user@example.com");
        assert_eq!(path.file_name().unwrap(), "user%40example%2Ecom.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        remote
            .save("user@example.com", &write_of(&["a"], Some(0)))
            .await
            .unwrap();
        let doc = remote.load("user@example.com").await.unwrap().unwrap();
        assert_eq!(doc.updated_at, Some(42));
        assert_eq!(doc.projects[0].name, "a");

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
    }

    #[tokio::test]
    async fn file_remote_tolerates_garbage() {
        let dir = TempDir::new().unwrap();
        let remote = FileRemote::new(dir.path(), Arc::new(ManualClock::at_ms(0)));
        std::fs::write(remote.document_path("u1"), "[1, 2").unwrap();
        let doc = remote.load("u1").await.unwrap().unwrap();
        assert!(doc.projects.is_empty());
        assert_eq!(doc.updated_at, None);
    }
}
