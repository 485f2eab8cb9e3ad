//! Draft autosave
//!
//! Debounces field-level edits into writes against the persistence
//! collaborator. Discrete choices (selects, checkboxes) ask for an immediate
//! commit; free text asks for a delayed one on blur. Either way at most one
//! commit is scheduled per coordinator at any time, and immediate commits
//! are rate limited so rapid clicking cannot produce a write storm.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Floor between two immediate commits.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1000);
/// Debounce window for delayed commits.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// What gets handed to the persistence collaborator: the workflow state id
/// the draft currently sits in plus the (possibly partial) form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    #[serde(rename = "stateId")]
    pub state_id: Option<i64>,
    pub payload: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AutosaveError {
    #[error("autosave sink rejected commit: {message}")]
    Sink { message: String },
}

/// Write side of the persistence boundary.
#[async_trait]
pub trait DraftSink: Send + Sync + 'static {
    async fn commit(&self, request: CommitRequest) -> Result<(), AutosaveError>;
}

struct Scheduled {
    handle: JoinHandle<()>,
    deadline: Instant,
}

/// Debounce and rate-limit policy for draft writes.
///
/// Not `Clone`; one coordinator owns one pending-commit slot. Dropping the
/// coordinator aborts whatever is still scheduled.
pub struct AutosaveCoordinator<S: DraftSink> {
    sink: Arc<S>,
    delay: Duration,
    min_interval: Duration,
    enabled: bool,
    last_commit: Arc<Mutex<Option<Instant>>>,
    scheduled: Option<Scheduled>,
}

impl<S: DraftSink> AutosaveCoordinator<S> {
    pub fn new(sink: S) -> Self {
        Self::with_timing(sink, DEFAULT_DELAY, MIN_INTERVAL)
    }

    pub fn with_timing(sink: S, delay: Duration, min_interval: Duration) -> Self {
        AutosaveCoordinator {
            sink: Arc::new(sink),
            delay,
            min_interval,
            enabled: true,
            last_commit: Arc::new(Mutex::new(None)),
            scheduled: None,
        }
    }

    /// Turn autosave off (e.g. while a committing save is in progress) or
    /// back on. Disabling does not cancel an already scheduled commit.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.as_ref().map_or(false, |s| !s.handle.is_finished())
    }

    /// Register an edit.
    ///
    /// `immediate` commits right away when the rate-limit window allows it,
    /// and errors from the sink then surface to the caller. When the window
    /// does not allow it, or for a non-immediate trigger, the commit is
    /// scheduled instead and sink errors are only logged. A new trigger
    /// always replaces the previously scheduled commit, carrying forward its
    /// deadline so repeated edits cannot push the write out indefinitely.
    pub async fn trigger(
        &mut self,
        request: CommitRequest,
        immediate: bool,
    ) -> Result<(), AutosaveError> {
        if !self.enabled {
            return Ok(());
        }

        let pending_deadline = self.scheduled.as_ref().and_then(|s| {
            if s.handle.is_finished() {
                None
            } else {
                Some(s.deadline)
            }
        });
        self.cancel();

        let now = Instant::now();
        let last = *self
            .last_commit
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if immediate {
            let ready = last.map_or(true, |at| now.duration_since(at) >= self.min_interval);
            if ready {
                self.sink.commit(request).await?;
                *self
                    .last_commit
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(now);
                return Ok(());
            }
        }

        let deadline = if immediate {
            // Too soon after the last commit: defer to the earliest instant
            // the rate limit allows instead of dropping the edit.
            last.map_or(now, |at| at + self.min_interval)
        } else {
            pending_deadline.unwrap_or(now + self.delay)
        };

        let sink = Arc::clone(&self.sink);
        let last_commit = Arc::clone(&self.last_commit);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            match sink.commit(request).await {
                Ok(()) => {
                    *last_commit
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner) =
                        Some(Instant::now());
                }
                Err(err) => {
                    tracing::warn!(%err, "scheduled autosave commit failed");
                }
            }
        });
        self.scheduled = Some(Scheduled { handle, deadline });
        Ok(())
    }

    /// Abort the pending commit, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            scheduled.handle.abort();
        }
    }
}

impl<S: DraftSink> Drop for AutosaveCoordinator<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
