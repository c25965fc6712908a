//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use course_registration::api::{ApiClient, ApiRequest};
use course_registration::error::ApiError;
use course_registration::screens::Screen;
use serde_json::Value;
use tokio::sync::Notify;

/// Scripted API: answers with queued replies in order and records every
/// request it receives. Unscripted calls resolve to `null`.
#[derive(Default)]
pub struct FakeApi {
    replies: Mutex<VecDeque<Result<Value, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
    gate: Option<Arc<Notify>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn ok(self, value: Value) -> Self {
        self.replies.lock().unwrap().push_back(Ok(value));
        self
    }
    pub fn reject(self, endpoint: &str, status: u16) -> Self {
        self.replies.lock().unwrap().push_back(Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: "{\"error\":\"rejected\"}".to_string(),
        }));
        self
    }
    /// Every call waits for one notification on `gate` before answering
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn invoke(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

/// A value set that passes every rule of `screen`
pub fn valid_values(screen: Screen) -> Vec<(&'static str, &'static str)> {
    match screen {
        Screen::Login => vec![("email", "a@b.com"), ("password", "longenough1")],
        Screen::Signup => vec![
            ("last_name", "Bat"),
            ("first_name", "Sara"),
            ("email", "sara@example.com"),
            ("phone_number", "99112233"),
            ("password", "longenough1"),
            ("password_confirmation", "longenough1"),
        ],
        Screen::CompanySignup => vec![
            ("company_name", "Acme"),
            ("company_register", "REG-001"),
            ("address", "1 Main St"),
            ("company_email", "office@acme.test"),
            ("company_phone_number", "70001122"),
            ("last_name", "Bat"),
            ("first_name", "Sara"),
            ("email", "sara@acme.test"),
            ("phone_number", "99112233"),
            ("password", "longenough1"),
            ("password_confirmation", "longenough1"),
        ],
        Screen::CreateCourse => vec![
            ("course_name", "Rust 101"),
            ("description", "Ownership and borrowing"),
            ("duration", "6 weeks"),
            ("type", "online"),
            ("registration_start_date", "2025-01-06"),
            ("registration_due_date", "2025-01-31"),
            ("start_date", "2025-02-03"),
            ("company_id", "7"),
        ],
    }
}
