//! Route change on successful submission
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::status::{StatusStore, SubmissionStatus, SubscriptionId};

pub trait Router: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Router that only remembers where it was sent
#[derive(Debug, Default)]
pub struct MemoryRouter {
    visited: Mutex<Vec<String>>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

impl Router for MemoryRouter {
    fn navigate(&self, path: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(path.to_string());
        }
    }
}

/// Navigates once per transition into `Succeeded`.
///
/// The last status seen is tracked here rather than taken from the change,
/// so a repeated notification of the same status never navigates twice.
/// Detaches from the store when dropped.
pub struct NavigationEffect {
    store: StatusStore,
    subscription: SubscriptionId,
    destination: String,
}

impl NavigationEffect {
    pub fn attach(
        store: &StatusStore,
        form: &str,
        destination: &str,
        router: Arc<dyn Router>,
    ) -> Self {
        let last_seen = Mutex::new(store.get(form));
        let path = destination.to_string();

        let subscription = store.subscribe(form, move |change| {
            let current = change.current.status;
            let previous = match last_seen.lock() {
                Ok(mut last) => std::mem::replace(&mut *last, current),
                Err(_) => return,
            };
            if previous == current {
                return;
            }
            match current {
                SubmissionStatus::Succeeded => {
                    info!(form = %change.form, destination = %path, "navigating");
                    router.navigate(&path);
                }
                SubmissionStatus::Failed => {
                    warn!(form = %change.form, "submission failed, staying on form");
                }
                _ => {}
            }
        });

        Self {
            store: store.clone(),
            subscription,
            destination: destination.to_string(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl Drop for NavigationEffect {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
