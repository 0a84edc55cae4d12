use thiserror::Error;

use apollo_client::{ApolloError, ErrorKind};

use crate::state::{RunContext, RunState};

/// Bad configuration. The run never starts and stays Idle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no contacts")]
    NoContacts,

    #[error("missing credential")]
    MissingCredential,

    #[error("batch size must be greater than 0")]
    InvalidBatchSize,

    #[error("run is {0}; only a paused run can be resumed")]
    NotResumable(RunState),
}

/// One batch's external call failed. Absorbed by the orchestrator, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchEnrichmentError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("enrichment failed: {0}")]
    Failed(String),
}

impl BatchEnrichmentError {
    /// Stable machine-readable kind, used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchEnrichmentError::Authentication(_) => "authentication",
            BatchEnrichmentError::RateLimited(_) => "rate_limited",
            BatchEnrichmentError::InvalidInput(_) => "invalid_input",
            BatchEnrichmentError::Timeout(_) => "timeout",
            BatchEnrichmentError::Failed(_) => "failed",
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            BatchEnrichmentError::Authentication(m)
            | BatchEnrichmentError::RateLimited(m)
            | BatchEnrichmentError::InvalidInput(m)
            | BatchEnrichmentError::Timeout(m)
            | BatchEnrichmentError::Failed(m) => m,
        }
    }

    /// Rebuild from a wire kind. Unknown kinds become `Failed`.
    pub fn from_kind(kind: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            "authentication" => BatchEnrichmentError::Authentication(message),
            "rate_limited" => BatchEnrichmentError::RateLimited(message),
            "invalid_input" => BatchEnrichmentError::InvalidInput(message),
            "timeout" => BatchEnrichmentError::Timeout(message),
            _ => BatchEnrichmentError::Failed(message),
        }
    }

    /// Classify by HTTP status when the body carries no kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => BatchEnrichmentError::Authentication(message),
            429 => BatchEnrichmentError::RateLimited(message),
            400 | 422 => BatchEnrichmentError::InvalidInput(message),
            504 => BatchEnrichmentError::Timeout(message),
            _ => BatchEnrichmentError::Failed(message),
        }
    }
}

impl From<ApolloError> for BatchEnrichmentError {
    fn from(err: ApolloError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Unauthorized => BatchEnrichmentError::Authentication(message),
            ErrorKind::RateLimited => BatchEnrichmentError::RateLimited(message),
            ErrorKind::InvalidInput => BatchEnrichmentError::InvalidInput(message),
            ErrorKind::Timeout => BatchEnrichmentError::Timeout(message),
            ErrorKind::Other => BatchEnrichmentError::Failed(message),
        }
    }
}

/// The enrichment call broke its contract. Aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    #[error("batch {batch} returned {actual} results for {expected} contacts")]
    ResultCountMismatch {
        batch: usize,
        expected: usize,
        actual: usize,
    },
}

/// What `run` and `resume` surface to the caller.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The run was aborted. `context` keeps every batch merged before the fault.
    #[error("run aborted: {error}")]
    Orchestration {
        error: OrchestrationError,
        context: Box<RunContext>,
    },
}

impl RunError {
    /// Partial results preserved by an aborted run.
    pub fn context(&self) -> Option<&RunContext> {
        match self {
            RunError::Orchestration { context, .. } => Some(context),
            RunError::Validation(_) => None,
        }
    }
}
