//! Catalog readiness gate
//!
//! The state catalog arrives from the persistence collaborator at some point
//! after startup. Work that needs hydrated state ids (committing saves,
//! transition resolution for display) parks on the gate until it opens;
//! reads that tolerate defaults go straight through the registry instead.

use tokio::sync::watch;

/// One-shot open gate. Opens once, never closes, and can be observed by any
/// number of waiters.
#[derive(Debug)]
pub struct ReadinessGate {
    tx: watch::Sender<bool>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        ReadinessGate { tx }
    }

    /// Open the gate, waking all waiters. Idempotent.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn handle(&self) -> ReadinessHandle {
        ReadinessHandle { rx: self.tx.subscribe() }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Waiter side of a [`ReadinessGate`].
#[derive(Debug, Clone)]
pub struct ReadinessHandle {
    rx: watch::Receiver<bool>,
}

impl ReadinessHandle {
    /// Resolve once the gate opens. Returns immediately if it already has.
    ///
    /// Returns whether the gate actually opened. A gate dropped before
    /// `open()` releases its waiters with `false` so the entity-load path
    /// can tell an opened gate from an abandoned one.
    pub async fn wait_ready(&mut self) -> bool {
        let opened = self.rx.wait_for(|ready| *ready).await.is_ok();
        if opened {
            true
        } else {
            // Sender dropped; the last observed value decides.
            let ready = *self.rx.borrow();
            if !ready {
                tracing::warn!("readiness gate dropped before opening");
            }
            ready
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }
}
