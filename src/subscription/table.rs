//! Subscription table: routes push notifications to long-lived listeners.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{SystemTime, UNIX_EPOCH},
};

use super::sink::NotificationSink;
use crate::{
    live,
    models::{LiveUpdate, SubscriptionInfo},
};

/// Current time in millis since Unix epoch.
#[inline]
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

struct SubscriptionEntry {
    sink: Arc<dyn NotificationSink>,
    diff: bool,
    created_at_ms: u64,
    last_event_time_ms: Option<u64>,
    frames_routed: u64,
}

#[derive(Default)]
pub(crate) struct SubscriptionTable {
    inner: Mutex<HashMap<String, SubscriptionEntry>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SubscriptionEntry>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a listener. Re-registering an id replaces the previous sink.
    pub fn register(&self, id: impl Into<String>, sink: Arc<dyn NotificationSink>, diff: bool) {
        let id = id.into();
        let entry = SubscriptionEntry {
            sink,
            diff,
            created_at_ms: now_ms(),
            last_event_time_ms: None,
            frames_routed: 0,
        };
        if self.lock().insert(id.clone(), entry).is_some() {
            log::debug!("[strata-link] Replaced existing subscription '{}'", id);
        }
    }

    /// Normalize `update` and hand each notification to its listener.
    ///
    /// Returns the number of notifications delivered. Unknown ids deliver
    /// nothing. The lock is not held while the sink runs.
    pub async fn invoke(&self, update: LiveUpdate) -> usize {
        let (sink, diff) = {
            let mut subs = self.lock();
            match subs.get_mut(&update.subscription_id) {
                Some(entry) => {
                    entry.last_event_time_ms = Some(now_ms());
                    entry.frames_routed += 1;
                    (entry.sink.clone(), entry.diff)
                },
                None => {
                    log::debug!(
                        "[strata-link] No subscription found for id: {}",
                        update.subscription_id
                    );
                    return 0;
                },
            }
        };

        let mut delivered = 0;
        for notification in live::normalize(&update, diff) {
            if !sink.deliver(notification).await {
                log::debug!(
                    "[strata-link] Subscription {} listener dropped",
                    update.subscription_id
                );
                self.remove_if_same(&update.subscription_id, &sink);
                break;
            }
            delivered += 1;
        }
        delivered
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Remove `id` only if it still points at `sink`, so a listener that went
    /// away cannot evict a replacement registered under the same id.
    fn remove_if_same(&self, id: &str, sink: &Arc<dyn NotificationSink>) {
        let mut subs = self.lock();
        if subs.get(id).is_some_and(|entry| Arc::ptr_eq(&entry.sink, sink)) {
            subs.remove(id);
        }
    }

    pub fn clear(&self) -> usize {
        let mut subs = self.lock();
        let count = subs.len();
        subs.clear();
        count
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Build a `Vec<SubscriptionInfo>` snapshot of the table.
    pub fn snapshot(&self) -> Vec<SubscriptionInfo> {
        self.lock()
            .iter()
            .map(|(id, entry)| SubscriptionInfo {
                id: id.clone(),
                diff: entry.diff,
                created_at_ms: entry.created_at_ms,
                last_event_time_ms: entry.last_event_time_ms,
                frames_routed: entry.frames_routed,
            })
            .collect()
    }
}
