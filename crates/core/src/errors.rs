use thiserror::Error;

use crate::catalog::StoreError;

/// Failures of the recommendation pipeline. Any of these aborts the whole
/// call; there are no partial feature matrices or partial result lists.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecommendError {
    #[error("malformed composition segment `{segment}`: {reason}")]
    MalformedComposition { segment: String, reason: String },
    #[error("no material emission data for category `{0}`")]
    UnknownCategory(String),
    #[error("product set for category `{0}` is empty")]
    EmptyProductSet(String),
    #[error("row index {index} is out of range for a matrix with {rows} rows")]
    IndexOutOfRange { index: usize, rows: usize },
    #[error("cannot query {requested} neighbors: only {available} rows are indexed")]
    InsufficientData { requested: usize, available: usize },
    #[error("feature row has {found} columns, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

impl RecommendError {
    pub(crate) fn malformed(segment: &str, reason: impl Into<String>) -> Self {
        Self::MalformedComposition { segment: segment.to_owned(), reason: reason.into() }
    }

    /// True when the failure is caused by caller input or catalog data rather
    /// than a broken internal contract.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::MalformedComposition { .. }
                | Self::UnknownCategory(_)
                | Self::EmptyProductSet(_)
        )
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Recommend(#[from] RecommendError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn not_found(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::NotFound { message: message.into(), correlation_id: correlation_id.into() }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The selected product was not found in this category.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Recommend(error) if error.is_user_facing() => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Recommend(error) => {
                Self::Internal { message: error.to_string(), correlation_id }
            }
            ApplicationError::Store(StoreError::UnsupportedCategory(category)) => Self::BadRequest {
                message: format!("unsupported category: `{category}`"),
                correlation_id,
            },
            ApplicationError::Store(StoreError::Backend(message)) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}
