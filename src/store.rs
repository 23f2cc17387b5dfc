//! The planner session: in-memory state, its local snapshot and the
//! optional cloud replica.
//!
//! Every mutation goes through [`PlannerStore`], which marks the session
//! dirty, persists the local snapshot and schedules a debounced remote
//! write when a user is connected.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};

use crate::io::local_store::{KvStore, load_local, save_local};
use crate::model::project::Project;
use crate::model::state::{PlannerState, Snapshot};
use crate::model::task::{NewTask, TaskField};
use crate::ops::progress::average_progress;
use crate::ops::project_ops::{self, ProjectError};
use crate::ops::task_ops::{self, TaskError};
use crate::ops::transfer::{self, ExportDocument, TransferError};
use crate::ops::week_bars::{WeekBar, build_week_bars};
use crate::sync::debounce::{DEFAULT_WINDOW, DebouncedWriter};
use crate::sync::remote::{Identity, IdentityProvider, RemoteStore, RemoteWrite};
use crate::sync::resolve::{Resolution, Winner, resolve_for_session};
use crate::sync::session::SessionPhase;
use crate::util::clock::{Clock, SystemClock};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error("no project selected")]
    NoActiveProject,
}

/// Everything needed to mirror the planner to a cloud document
pub struct CloudSync {
    pub identity: Arc<dyn IdentityProvider>,
    pub remote: Arc<dyn RemoteStore>,
    pub window: Duration,
}

impl CloudSync {
    pub fn new(identity: Arc<dyn IdentityProvider>, remote: Arc<dyn RemoteStore>) -> Self {
        CloudSync {
            identity,
            remote,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

struct SyncLink {
    identity: Arc<dyn IdentityProvider>,
    remote: Arc<dyn RemoteStore>,
    writer: DebouncedWriter,
    /// Set once `connect` has resolved a signed-in user
    user: Option<Identity>,
}

pub struct PlannerStore {
    local: Box<dyn KvStore>,
    clock: Arc<dyn Clock>,
    state: PlannerState,
    updated_at: i64,
    phase: SessionPhase,
    resolved: bool,
    sync: Option<SyncLink>,
}

impl PlannerStore {
    /// Load the local snapshot (or an empty one if it is unreadable) and
    /// start a clean, local-only session.
    pub fn open(local: Box<dyn KvStore>) -> Self {
        Self::with_clock(local, Arc::new(SystemClock))
    }

    pub fn with_clock(local: Box<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        let Snapshot { state, updated_at } = load_local(local.as_ref());
        PlannerStore {
            local,
            clock,
            state,
            updated_at,
            phase: SessionPhase::default(),
            resolved: false,
            sync: None,
        }
    }

    pub fn attach_sync(&mut self, sync: CloudSync) {
        let writer = DebouncedWriter::new(Arc::clone(&sync.remote), sync.window);
        self.sync = Some(SyncLink {
            identity: sync.identity,
            remote: sync.remote,
            writer,
            user: None,
        });
    }

    /// Reconcile with the remote replica, at most once per session.
    ///
    /// A failed remote read is logged and reported as
    /// [`Resolution::RemoteUnavailable`]; the session carries on locally and
    /// a later call may try again.
    pub async fn connect(&mut self) -> Resolution {
        let Some(link) = self.sync.as_mut() else {
            return Resolution::LocalOnly;
        };
        if self.resolved {
            return Resolution::AlreadyResolved;
        }
        let Some(user) = link.identity.identity().await else {
            tracing::info!("no signed-in user, staying local-only");
            return Resolution::LocalOnly;
        };
        link.user = Some(user.clone());
        let remote = Arc::clone(&link.remote);

        let loaded = match remote.load(&user.uid).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(uid = %user.uid, error = %e, "remote read failed, continuing locally");
                return Resolution::RemoteUnavailable;
            }
        };
        self.resolved = true;

        let outcome = match resolve_for_session(self.phase, load_local(self.local.as_ref()), loaded) {
            None => Resolution::SkippedDirty,
            Some((snapshot, Winner::Local)) => {
                self.state = snapshot.state;
                self.updated_at = snapshot.updated_at;
                Resolution::KeptLocal
            }
            Some((snapshot, Winner::Remote)) => {
                self.adopt(snapshot);
                Resolution::TookRemote
            }
        };
        tracing::info!(uid = %user.uid, outcome = ?outcome, "replicas reconciled");

        // The remote copy is stale unless it just won
        if outcome != Resolution::TookRemote {
            self.push_remote();
        }
        outcome
    }

    /// Wait for pending remote writes to land.
    pub async fn flush(&mut self) {
        if let Some(link) = self.sync.as_mut() {
            link.writer.flush().await;
        }
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.state.active_project()
    }

    /// Index of the selected project, or an error when nothing is selected.
    pub fn active_index(&self) -> Result<usize, PlannerError> {
        self.state.active.ok_or(PlannerError::NoActiveProject)
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The connected user, if `connect` found one.
    pub fn user(&self) -> Option<&Identity> {
        self.sync.as_ref().and_then(|link| link.user.as_ref())
    }

    pub fn local(&self) -> &dyn KvStore {
        self.local.as_ref()
    }

    pub fn week_bars(&self, anchor: NaiveDateTime) -> Vec<WeekBar> {
        build_week_bars(&self.state.projects, anchor)
    }

    pub fn average_progress(&self, project: usize) -> Result<u8, PlannerError> {
        let project = self
            .state
            .projects
            .get(project)
            .ok_or(ProjectError::NotFound(project))?;
        Ok(average_progress(&project.tasks))
    }

    pub fn export(&self, note: Option<String>) -> ExportDocument {
        transfer::export_state(&self.state, note, self.clock.now())
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn add_project(&mut self, name: &str) -> Result<usize, PlannerError> {
        let index = project_ops::add_project(&mut self.state, name)?;
        self.commit();
        Ok(index)
    }

    pub fn rename_project(&mut self, index: usize, name: &str) -> Result<(), PlannerError> {
        project_ops::rename_project(&mut self.state, index, name)?;
        self.commit();
        Ok(())
    }

    pub fn set_project_emoji(&mut self, index: usize, emoji: &str) -> Result<(), PlannerError> {
        project_ops::set_emoji(&mut self.state, index, emoji)?;
        self.commit();
        Ok(())
    }

    pub fn delete_project(&mut self, index: usize) -> Result<Project, PlannerError> {
        let removed = project_ops::delete_project(&mut self.state, index)?;
        self.commit();
        Ok(removed)
    }

    /// Returns `false` (and writes nothing) when the move is a no-op.
    pub fn move_project(&mut self, from: usize, to: usize) -> bool {
        let moved = project_ops::move_project(&mut self.state, from, to);
        if moved {
            self.commit();
        }
        moved
    }

    pub fn select_project(&mut self, index: Option<usize>) -> Result<(), PlannerError> {
        project_ops::select_project(&mut self.state, index)?;
        self.commit();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, project: usize, draft: NewTask) -> Result<String, PlannerError> {
        let target = project_ops::project_mut(&mut self.state, project)?;
        let id = task_ops::add_task(target, draft)?;
        self.commit();
        Ok(id)
    }

    pub fn update_task(&mut self, project: usize, task: usize, field: TaskField) -> Result<(), PlannerError> {
        let target = project_ops::project_mut(&mut self.state, project)?;
        task_ops::update_task(target, task, field)?;
        self.commit();
        Ok(())
    }

    pub fn delete_task(&mut self, project: usize, task: usize) -> Result<(), PlannerError> {
        let target = project_ops::project_mut(&mut self.state, project)?;
        task_ops::delete_task(target, task)?;
        self.commit();
        Ok(())
    }

    pub fn move_task(&mut self, project: usize, from: usize, to: usize) -> Result<bool, PlannerError> {
        let target = project_ops::project_mut(&mut self.state, project)?;
        let moved = task_ops::move_task(target, from, to);
        if moved {
            self.commit();
        }
        Ok(moved)
    }

    // -----------------------------------------------------------------------
    // Transfer
    // -----------------------------------------------------------------------

    /// Replace every project with the contents of an exported document.
    /// Returns the number of projects imported. Invalid JSON leaves the
    /// state untouched.
    pub fn import(&mut self, text: &str) -> Result<usize, PlannerError> {
        let imported = transfer::import_json(text)?;
        let count = imported.projects.len();
        project_ops::replace_projects(&mut self.state, imported.projects);
        self.commit();
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn commit(&mut self) {
        self.phase.mark_dirty();
        let now = self.clock.now();
        match save_local(self.local.as_mut(), &self.state, now) {
            Ok(()) => self.updated_at = now.timestamp_millis(),
            Err(e) => tracing::warn!(error = %e, "could not save local snapshot"),
        }
        self.push_remote();
    }

    /// Take the remote replica wholesale, keeping its timestamp locally so
    /// the two copies compare equal next session.
    fn adopt(&mut self, snapshot: Snapshot) {
        self.state = snapshot.state;
        self.updated_at = snapshot.updated_at;
        let stamp = DateTime::from_timestamp_millis(snapshot.updated_at).unwrap_or_default();
        if let Err(e) = save_local(self.local.as_mut(), &self.state, stamp) {
            tracing::warn!(error = %e, "could not save adopted snapshot");
        }
    }

    fn push_remote(&mut self) {
        let Some(link) = self.sync.as_mut() else {
            return;
        };
        if let Some(user) = &link.user {
            link.writer.schedule(&user.uid, RemoteWrite::from(&self.state));
        }
    }
}
