//! Persisted record of finished submissions
//!
//! Each terminal transition is stored as a CBOR encoded [`SubmissionRecord`]
//! in sled. Keys are `<form>/<sled id>` so a prefix scan returns one form's
//! records in the order they were written.
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::warn;

use super::status::{StatusChange, StatusStore, SubmissionStatus, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct SubmissionRecord {
    #[n(0)]
    pub attempt_id: String,
    #[n(1)]
    pub form: String,
    #[n(2)]
    pub status: SubmissionStatus,
    /// Milliseconds since the Unix epoch
    #[n(3)]
    pub recorded_at: i64,
    #[n(4)]
    pub failure: Option<String>, // diagnostic text, never shown to users
}

impl SubmissionRecord {
    /// Only terminal transitions become records
    pub fn from_change(change: &StatusChange) -> Option<Self> {
        if !change.current.status.is_terminal() {
            return None;
        }

        Some(Self {
            attempt_id: change.current.attempt_id.clone().unwrap_or_default(),
            form: change.form.clone(),
            status: change.current.status,
            recorded_at: Utc::now().timestamp_millis(),
            failure: change.current.failure.clone(),
        })
    }

    pub fn recorded_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.recorded_at)
    }
}

#[derive(Clone)]
pub struct SubmissionLog {
    instance: Arc<sled::Db>,
}

impl SubmissionLog {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    pub fn open(path: &std::path::Path) -> anyhow::Result<Self> {
        let db = sled::open(path)
            .with_context(|| format!("failed to open submission history at {}", path.display()))?;
        Ok(Self::new(Arc::new(db)))
    }

    fn prefix(form: &str) -> Vec<u8> {
        let mut key = form.as_bytes().to_vec();
        key.push(b'/');
        key
    }

    pub fn append(&self, record: &SubmissionRecord) -> anyhow::Result<()> {
        let mut key = Self::prefix(&record.form);
        key.extend_from_slice(&self.instance.generate_id()?.to_be_bytes());

        self.instance.insert(key, minicbor::to_vec(record)?)?;
        Ok(())
    }

    /// Records for `form`, oldest first
    pub fn history(&self, form: &str) -> anyhow::Result<Vec<SubmissionRecord>> {
        self.instance
            .scan_prefix(Self::prefix(form))
            .values()
            .map(|bytes| -> anyhow::Result<SubmissionRecord> {
                let bytes = bytes?;
                let record: SubmissionRecord = minicbor::decode(&bytes)?;
                Ok(record)
            })
            .collect()
    }

    pub fn latest(&self, form: &str) -> anyhow::Result<Option<SubmissionRecord>> {
        match self.instance.scan_prefix(Self::prefix(form)).values().next_back() {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes?)?)),
            None => Ok(None),
        }
    }

    /// Appends a record for every terminal transition in `store`.
    /// A write failure is logged and does not disturb the submission.
    pub fn record_from(&self, store: &StatusStore) -> SubscriptionId {
        let log = self.clone();
        store.subscribe_all(move |change| {
            let Some(record) = SubmissionRecord::from_change(change) else {
                return;
            };
            if let Err(e) = log.append(&record) {
                warn!(form = %record.form, error = %e, "failed to persist submission record");
            }
        })
    }

    pub fn flush(&self) -> anyhow::Result<()> {
        self.instance.flush()?;
        Ok(())
    }
}
