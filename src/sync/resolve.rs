//! Latest-write-wins choice between the local and remote replicas.

use serde::Serialize;

use super::session::SessionPhase;
use crate::model::state::{PlannerState, RemoteSnapshot, Snapshot};

/// Which replica a resolution kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Local,
    Remote,
}

/// What happened when the session tried to reconcile with the remote copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// No identity or no remote store: nothing to reconcile
    LocalOnly,
    /// The remote read failed; carrying on with local state
    RemoteUnavailable,
    /// Local edits happened first; the remote snapshot was ignored
    SkippedDirty,
    /// Reconciliation already ran this session
    AlreadyResolved,
    KeptLocal,
    TookRemote,
}

/// Which replica `resolve` would keep. The remote wins ties.
pub fn winner(local: &Snapshot, remote: Option<&RemoteSnapshot>) -> Winner {
    match remote {
        Some(r) if r.updated_at.unwrap_or(0) >= local.updated_at => Winner::Remote,
        _ => Winner::Local,
    }
}

/// Pick the newer replica. An absent remote keeps `local`; an unresolved
/// remote timestamp counts as `0`; equal timestamps go to the remote.
pub fn resolve(local: Snapshot, remote: Option<RemoteSnapshot>) -> Snapshot {
    match remote {
        Some(r) if winner(&local, Some(&r)) == Winner::Remote => {
            let updated_at = r.updated_at.unwrap_or(0);
            Snapshot::new(PlannerState::new(r.projects, r.active), updated_at)
        }
        _ => local,
    }
}

/// Session-gated resolution: returns `None` when the session is already
/// dirty, so in-progress edits are never replaced.
pub fn resolve_for_session(
    phase: SessionPhase,
    local: Snapshot,
    remote: Option<RemoteSnapshot>,
) -> Option<(Snapshot, Winner)> {
    if phase.is_dirty() {
        return None;
    }
    let w = winner(&local, remote.as_ref());
    Some((resolve(local, remote), w))
}
