//! Gateway collaborator errors.

use thiserror::Error;

/// Errors from the gateway-routes and profile collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The collaborator could not be reached or answered with an error status.
    #[error("{endpoint} unavailable: {details}")]
    Unavailable { endpoint: String, details: String },

    /// The collaborator answered with a body that could not be decoded.
    #[error("{endpoint} returned an invalid body: {details}")]
    InvalidResponse { endpoint: String, details: String },
}

impl GatewayError {
    pub fn unavailable(endpoint: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Unavailable {
            endpoint: endpoint.into(),
            details: details.into(),
        }
    }

    pub fn invalid_response(endpoint: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidResponse {
            endpoint: endpoint.into(),
            details: details.into(),
        }
    }

    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "unavailable",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }
}
