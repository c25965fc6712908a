//! One live form: its state, its chain and what happens after submit
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::debug;

use super::api::ApiClient;
use super::chain::Chain;
use super::error::{ChainError, FormError};
use super::form::{FieldValue, FormSnapshot, FormState};
use super::navigation::{NavigationEffect, Router};
use super::orchestrator::{ChainOutcome, Orchestrator};
use super::status::{StatusStore, SubmissionStatus};

/// The only failure text a user ever sees
pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation blocked the submission; no request was issued
    Invalid(BTreeMap<String, String>),
    /// A submission for this form was already in flight
    Ignored,
    Succeeded(Value),
    Failed(ChainError),
}

pub struct FormController {
    state: Mutex<FormState>,
    chain: Chain,
    orchestrator: Orchestrator,
    store: StatusStore,
    navigation: Option<NavigationEffect>,
}

impl FormController {
    pub fn new(
        form: &str,
        state: FormState,
        chain: Chain,
        store: &StatusStore,
        client: Arc<dyn ApiClient>,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            chain,
            orchestrator: Orchestrator::new(form, store.clone(), client),
            store: store.clone(),
            navigation: None,
        }
    }

    pub fn navigate_on_success(mut self, destination: &str, router: Arc<dyn Router>) -> Self {
        self.navigation = Some(NavigationEffect::attach(
            &self.store,
            self.orchestrator.form(),
            destination,
            router,
        ));
        self
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn form(&self) -> &str {
        self.orchestrator.form()
    }

    pub fn destination(&self) -> Option<&str> {
        self.navigation.as_ref().map(NavigationEffect::destination)
    }

    /// Edits stay possible while a submission is in flight
    pub fn set_value(&self, field: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        self.lock().set_value(field, value)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.lock().snapshot()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.store.get(self.form())
    }

    /// The submit control should be disabled while this holds
    pub fn is_busy(&self) -> bool {
        self.status() == SubmissionStatus::InFlight
    }

    pub fn banner(&self) -> Option<&'static str> {
        match self.status() {
            SubmissionStatus::Failed => Some(GENERIC_FAILURE),
            _ => None,
        }
    }

    /// Diagnostic text of the last failure, for logs only
    pub fn failure_detail(&self) -> Option<String> {
        self.store.entry(self.form()).failure
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let validated = self.lock().validated();
        let values = match validated {
            Ok(values) => values,
            Err(errors) => {
                debug!(form = %self.form(), invalid = errors.len(), "submission blocked by validation");
                return SubmitOutcome::Invalid(errors);
            }
        };

        match self.orchestrator.run(&values, &self.chain).await {
            ChainOutcome::Ignored => SubmitOutcome::Ignored,
            ChainOutcome::Succeeded(result) => SubmitOutcome::Succeeded(result),
            ChainOutcome::Failed(e) => SubmitOutcome::Failed(e),
        }
    }
}
