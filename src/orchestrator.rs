//! Runs a chain for one form and drives its submission status
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::api::ApiClient;
use super::chain::Chain;
use super::error::ChainError;
use super::form::Values;
use super::status::StatusStore;
use super::utils::new_attempt_id;

#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    /// Another chain for this form was still in flight; nothing was issued
    Ignored,
    Succeeded(Value),
    Failed(ChainError),
}

/// Fails the form if a run is dropped while its chain is still in flight
struct PendingAttempt<'a> {
    store: &'a StatusStore,
    form: &'a str,
    settled: bool,
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(form = %self.form, "submission dropped before the chain finished");
            self.store.fail(self.form, String::from("submission abandoned before completion"));
        }
    }
}

pub struct Orchestrator {
    form: String,
    store: StatusStore,
    client: Arc<dyn ApiClient>,
}

impl Orchestrator {
    pub fn new(form: &str, store: StatusStore, client: Arc<dyn ApiClient>) -> Self {
        Self {
            form: form.to_string(),
            store,
            client,
        }
    }

    pub fn form(&self) -> &str {
        &self.form
    }

    /// Issues the chain's steps strictly in order. The first rejection stops
    /// the chain and marks the form failed; steps that already succeeded are
    /// left as they are.
    pub async fn run(&self, values: &Values, chain: &Chain) -> ChainOutcome {
        // id generation only fails on a malformed prefix constant
        let attempt_id = new_attempt_id().unwrap_or_else(|_| String::from("attempt"));

        if !self.store.try_begin(&self.form, &attempt_id) {
            warn!(form = %self.form, "submission already in flight, ignoring");
            return ChainOutcome::Ignored;
        }

        let mut pending = PendingAttempt {
            store: &self.store,
            form: &self.form,
            settled: false,
        };
        let outcome = self.issue(values, chain).await;
        pending.settled = true;

        match outcome {
            Ok(result) => {
                info!(form = %self.form, %attempt_id, "submission succeeded");
                self.store.succeed(&self.form, result.clone());
                ChainOutcome::Succeeded(result)
            }
            Err(e) => {
                error!(form = %self.form, %attempt_id, step = e.index(), error = %e, "submission failed");
                self.store.fail(&self.form, e.to_string());
                ChainOutcome::Failed(e)
            }
        }
    }

    async fn issue(&self, values: &Values, chain: &Chain) -> Result<Value, ChainError> {
        let mut results: Vec<Value> = Vec::with_capacity(chain.len());

        for (index, step) in chain.steps().iter().enumerate() {
            let request = step
                .request(values, &results)
                .map_err(|reason| ChainError::Payload {
                    index,
                    name: step.name().to_string(),
                    reason,
                })?;

            debug!(form = %self.form, index, step = step.name(), endpoint = step.endpoint(), "issuing step");

            let result = self
                .client
                .invoke(request)
                .await
                .map_err(|source| ChainError::Rejected {
                    index,
                    name: step.name().to_string(),
                    source,
                })?;

            debug!(form = %self.form, index, step = step.name(), "step resolved");
            results.push(result);
        }

        Ok(results.pop().unwrap_or(Value::Null))
    }
}
