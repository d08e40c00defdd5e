use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("closet item {position} rejected: {reason}")]
    InvalidClosetItem { position: usize, reason: String },
    #[error("advice contract violated: {0}")]
    AdviceContract(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::Internal { correlation_id, .. } => {
                correlation_id
            }
        }
    }
}

impl DomainError {
    /// Maps to the caller-facing error, tagged with the request's correlation id.
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            error @ (Self::InvalidClosetItem { .. } | Self::InvariantViolation(_)) => {
                InterfaceError::BadRequest { message: error.to_string(), correlation_id }
            }
            // contract breaches after repair are internal faults
            Self::AdviceContract(message) => InterfaceError::Internal { message, correlation_id },
        }
    }
}
