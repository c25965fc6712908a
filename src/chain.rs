//! Ordered, dependent request chains
//!
//! A [`Chain`] describes the requests one submission issues. Each step builds
//! its body from the validated values and the results of the steps before it,
//! which is how a later call consumes an identifier produced by an earlier one.
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::api::{ApiRequest, Credentials, Method};
use super::form::Values;

pub type PayloadFn = Arc<dyn Fn(&Values, &[Value]) -> Result<Value, String> + Send + Sync>;

#[derive(Clone)]
pub struct ChainStep {
    name: String,
    endpoint: String,
    method: Method,
    credentials: Credentials,
    payload: PayloadFn,
}

impl ChainStep {
    pub fn post<F>(name: &str, endpoint: &str, payload: F) -> Self
    where
        F: Fn(&Values, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            method: Method::Post,
            credentials: Credentials::Omit,
            payload: Arc::new(payload),
        }
    }
    pub fn with_credentials(mut self) -> Self {
        self.credentials = Credentials::Include;
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
    /// Builds this step's request from the values and the prior results
    pub fn request(&self, values: &Values, prior: &[Value]) -> Result<ApiRequest, String> {
        let body = (self.payload)(values, prior)?;

        Ok(ApiRequest {
            endpoint: self.endpoint.clone(),
            method: self.method,
            body,
            credentials: self.credentials,
        })
    }
}

impl fmt::Debug for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStep")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Non-empty by construction: a chain starts from its first step
#[derive(Debug, Clone)]
pub struct Chain {
    steps: Vec<ChainStep>,
}

impl Chain {
    pub fn start(first: ChainStep) -> Self {
        Self { steps: vec![first] }
    }
    pub fn then(mut self, step: ChainStep) -> Self {
        self.steps.push(step);
        self
    }
    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Reads an identifier out of a prior result, trying `data.id` then `id`
pub fn prior_id(result: &Value) -> Option<Value> {
    result
        .pointer("/data/id")
        .or_else(|| result.get("id"))
        .filter(|id| !id.is_null())
        .cloned()
}
