//! Result of running a request through its validation gates.

use crate::error::ErrorCode;

/// Either the parsed payload or the reason it was refused. No partial states.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome<T> {
    Accepted(T),
    Rejected(Rejection),
}

impl<T> ValidationOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ValidationOutcome::Accepted(_) => None,
            ValidationOutcome::Rejected(r) => Some(r),
        }
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: ErrorCode,
    /// Names of required fields that were absent or empty
    pub missing_fields: Vec<String>,
}

impl Rejection {
    pub fn invalid_request() -> Self {
        Self {
            code: ErrorCode::InvalidRequest,
            missing_fields: Vec::new(),
        }
    }

    pub fn missing_fields(fields: Vec<String>) -> Self {
        Self {
            code: ErrorCode::MissingFormFields,
            missing_fields: fields,
        }
    }

    pub fn server_error() -> Self {
        Self {
            code: ErrorCode::ServerError,
            missing_fields: Vec::new(),
        }
    }
}
