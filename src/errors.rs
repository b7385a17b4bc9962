use thiserror::Error;

use crate::types::LoanStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmiError {
    #[error("invalid loan terms: {message}")]
    InvalidTerms {
        message: String,
    },

    #[error("precondition failed: {message}")]
    Precondition {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid filter: {message}")]
    InvalidFilter {
        message: String,
    },

    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl EmiError {
    pub(crate) fn invalid_terms(message: impl Into<String>) -> Self {
        EmiError::InvalidTerms {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        EmiError::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_filter(message: impl Into<String>) -> Self {
        EmiError::InvalidFilter {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for EmiError {
    fn from(err: serde_json::Error) -> Self {
        EmiError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EmiError>;
