//! Debounced remote writes.
//!
//! Each edit reschedules a per-user timer; only the last edit of a burst is
//! written once the quiet window passes. A single gate keeps at most one
//! write in flight. A timer that fires while the gate is held waits for it,
//! and once a write has started it runs to completion even if newer edits
//! arrive.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::remote::{RemoteStore, RemoteWrite};

/// Default quiet window before a burst of edits is pushed.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(400);

/// Owns the timer handle table for pending remote writes, keyed by user id.
pub struct DebouncedWriter {
    remote: Arc<dyn RemoteStore>,
    window: Duration,
    /// Held for the duration of every remote write
    gate: Arc<Mutex<()>>,
    timers: HashMap<String, JoinHandle<()>>,
}

impl DebouncedWriter {
    pub fn new(remote: Arc<dyn RemoteStore>, window: Duration) -> Self {
        DebouncedWriter {
            remote,
            window,
            gate: Arc::new(Mutex::new(())),
            timers: HashMap::new(),
        }
    }

    /// Schedule `doc` to be written for `uid` after the quiet window,
    /// cancelling any timer still pending for that user.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, uid: &str, doc: RemoteWrite) {
        if let Some(previous) = self.timers.remove(uid) {
            previous.abort();
        }
        self.timers.retain(|_, handle| !handle.is_finished());

        let remote = Arc::clone(&self.remote);
        let gate = Arc::clone(&self.gate);
        let window = self.window;
        let key = uid.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let permit = gate.lock_owned().await;
            // Detached from this timer so aborting the timer cannot cut the write short
            let write = tokio::spawn(async move {
                let _permit = permit;
                match remote.save(&key, &doc).await {
                    Ok(()) => tracing::debug!(uid = %key, "remote snapshot written"),
                    Err(e) => tracing::warn!(uid = %key, error = %e, "remote write failed"),
                }
            });
            if let Err(e) = write.await {
                tracing::warn!(error = %e, "remote write task ended abnormally");
            }
        });
        self.timers.insert(uid.to_string(), handle);
    }

    /// Number of timers that have not finished yet.
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every scheduled write has fired and completed.
    pub async fn flush(&mut self) {
        for (_, handle) in self.timers.drain() {
            // An aborted timer reports a cancelled JoinError; nothing to do
            let _ = handle.await;
        }
        // Writes detached from aborted timers may still hold the gate
        let _idle = self.gate.lock().await;
    }

    /// Drop every pending timer without writing.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

impl Drop for DebouncedWriter {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
