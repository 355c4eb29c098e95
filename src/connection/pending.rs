//! Pending-call table: correlates each response with exactly one request.
//!
//! Every entry owns a `oneshot` sender, so an entry can be completed at most
//! once; completion always removes it from the table first.

use serde_json::Value as JsonValue;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use tokio::sync::oneshot;

use crate::{
    error::{Result, StrataLinkError},
    subscription::NotificationSink,
};

/// Receiver half handed to the caller of `send`.
pub(crate) type ResponseReceiver = oneshot::Receiver<Result<JsonValue>>;

/// Sink to install in the subscription table when a live call succeeds.
pub(crate) struct LiveRegistration {
    pub sink: Arc<dyn NotificationSink>,
    pub diff: bool,
}

/// One in-flight request.
pub(crate) struct PendingCall {
    tx: oneshot::Sender<Result<JsonValue>>,
    method: String,
    created_at: Instant,
    live: Option<LiveRegistration>,
}

impl PendingCall {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn take_live(&mut self) -> Option<LiveRegistration> {
        self.live.take()
    }

    /// Deliver the outcome. Returns `false` if the caller stopped waiting,
    /// in which case the outcome is discarded.
    pub fn complete(self, outcome: Result<JsonValue>) -> bool {
        self.tx.send(outcome).is_ok()
    }
}

#[derive(Default)]
pub(crate) struct PendingCalls {
    inner: Mutex<HashMap<u64, PendingCall>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, PendingCall>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, id: u64, method: &str) -> Result<ResponseReceiver> {
        self.register_with(id, method, None)
    }

    /// Create a single-resolution slot for `id`.
    pub fn register_with(
        &self,
        id: u64,
        method: &str,
        live: Option<LiveRegistration>,
    ) -> Result<ResponseReceiver> {
        let mut calls = self.lock();
        if calls.contains_key(&id) {
            log::error!("[strata-link] Request id {} registered twice", id);
            return Err(StrataLinkError::DuplicateId(id));
        }
        let (tx, rx) = oneshot::channel();
        calls.insert(
            id,
            PendingCall {
                tx,
                method: method.to_string(),
                created_at: Instant::now(),
                live,
            },
        );
        Ok(rx)
    }

    /// Remove the entry for `id` without completing it.
    pub fn take(&self, id: u64) -> Option<PendingCall> {
        self.lock().remove(&id)
    }

    /// Remove and complete the entry for `id`. Unknown ids are a logged no-op.
    pub fn resolve(&self, id: u64, outcome: Result<JsonValue>) -> bool {
        match self.take(id) {
            Some(call) => {
                if !call.complete(outcome) {
                    log::debug!("[strata-link] Caller for request {} stopped waiting", id);
                }
                true
            },
            None => {
                log::debug!("[strata-link] No pending call for response id {}", id);
                false
            },
        }
    }

    /// Remove an entry whose caller gave up (e.g. per-call timeout).
    pub fn cancel(&self, id: u64) -> bool {
        self.take(id).is_some()
    }

    /// Complete every remaining entry with `error` and empty the table.
    pub fn drain(&self, error: &StrataLinkError) -> usize {
        let drained: Vec<(u64, PendingCall)> = self.lock().drain().collect();
        let count = drained.len();
        for (id, call) in drained {
            log::debug!(
                "[strata-link] Failing pending call {} ({}) after {:?}: {}",
                id,
                call.method(),
                call.created_at().elapsed(),
                error
            );
            call.complete(Err(error.clone()));
        }
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
