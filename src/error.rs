#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Form has no field named '{0}'")]
    UnknownField(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{endpoint} responded with status {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Request to {endpoint} could not be sent: {reason}")]
    Transport { endpoint: String, reason: String },
    #[error("Response from {endpoint} was not valid JSON: {reason}")]
    Decode { endpoint: String, reason: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Step {index} ({name}) was rejected: {source}")]
    Rejected {
        index: usize,
        name: String,
        #[source]
        source: ApiError,
    },
    #[error("Step {index} ({name}) could not build its request: {reason}")]
    Payload {
        index: usize,
        name: String,
        reason: String,
    },
}

impl ChainError {
    /// Zero-based position of the step that stopped the chain
    pub fn index(&self) -> usize {
        match self {
            ChainError::Rejected { index, .. } | ChainError::Payload { index, .. } => *index,
        }
    }
}
