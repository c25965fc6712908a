//! Submission status per form and the store that shares it
//!
//! The store is created by the application root and handed to whoever needs
//! it. Only the orchestrator moves a form's status; everything else reads it
//! or subscribes to its transitions.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode)]
pub enum SubmissionStatus {
    #[default]
    #[n(0)]
    Idle,
    #[n(1)]
    InFlight,
    #[n(2)]
    Succeeded,
    #[n(3)]
    Failed,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Succeeded | SubmissionStatus::Failed)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::InFlight => "in-flight",
            SubmissionStatus::Succeeded => "succeeded",
            SubmissionStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Everything the store knows about one form's latest attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusEntry {
    pub status: SubmissionStatus,
    pub attempt_id: Option<String>,
    /// Final chain result, set on success
    pub result: Option<Value>,
    /// Diagnostic text of the failing step, set on failure
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub form: String,
    pub previous: SubmissionStatus,
    pub current: StatusEntry,
}

pub type Listener = Arc<dyn Fn(&StatusChange) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    // None listens to every form
    form: Option<String>,
    listener: Listener,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, StatusEntry>,
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct StatusStore {
    inner: Arc<Mutex<Inner>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a panicking listener never runs under the lock, so the data stays consistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, form: &str) -> SubmissionStatus {
        self.entry(form).status
    }

    pub fn entry(&self, form: &str) -> StatusEntry {
        self.lock().entries.get(form).cloned().unwrap_or_default()
    }

    pub fn subscribe<F>(&self, form: &str, listener: F) -> SubscriptionId
    where
        F: Fn(&StatusChange) + Send + Sync + 'static,
    {
        self.add_subscription(Some(form.to_string()), Arc::new(listener))
    }

    pub fn subscribe_all<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&StatusChange) + Send + Sync + 'static,
    {
        self.add_subscription(None, Arc::new(listener))
    }

    fn add_subscription(&self, form: Option<String>, listener: Listener) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscriptions.push(Subscription { id, form, listener });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscriptions.retain(|s| s.id != id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscriptions.len()
    }

    /// Drops every subscription and forgets all entries
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.subscriptions.clear();
        inner.entries.clear();
    }

    /// Atomically moves `form` into `InFlight` unless it is already there.
    /// Returns false for a re-entrant attempt.
    pub(crate) fn try_begin(&self, form: &str, attempt_id: &str) -> bool {
        let change = {
            let mut inner = self.lock();
            let entry = inner.entries.entry(form.to_string()).or_default();
            if entry.status == SubmissionStatus::InFlight {
                return false;
            }
            let previous = entry.status;
            *entry = StatusEntry {
                status: SubmissionStatus::InFlight,
                attempt_id: Some(attempt_id.to_string()),
                result: None,
                failure: None,
            };
            StatusChange {
                form: form.to_string(),
                previous,
                current: entry.clone(),
            }
        };
        self.notify(&change);
        true
    }

    pub(crate) fn succeed(&self, form: &str, result: Value) {
        self.finish(form, SubmissionStatus::Succeeded, Some(result), None);
    }

    pub(crate) fn fail(&self, form: &str, failure: String) {
        self.finish(form, SubmissionStatus::Failed, None, Some(failure));
    }

    fn finish(
        &self,
        form: &str,
        status: SubmissionStatus,
        result: Option<Value>,
        failure: Option<String>,
    ) {
        let change = {
            let mut inner = self.lock();
            let entry = inner.entries.entry(form.to_string()).or_default();
            let previous = entry.status;
            entry.status = status;
            entry.result = result;
            entry.failure = failure;
            StatusChange {
                form: form.to_string(),
                previous,
                current: entry.clone(),
            }
        };
        self.notify(&change);
    }

    // listeners are called after the lock is released so they may read the store
    fn notify(&self, change: &StatusChange) {
        let listeners: Vec<Listener> = self
            .lock()
            .subscriptions
            .iter()
            .filter(|s| s.form.as_deref().is_none_or(|form| form == change.form))
            .map(|s| Arc::clone(&s.listener))
            .collect();

        for listener in listeners {
            listener(change);
        }
    }
}

impl fmt::Debug for StatusStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("StatusStore")
            .field("entries", &inner.entries)
            .field("subscriptions", &inner.subscriptions.len())
            .finish()
    }
}
