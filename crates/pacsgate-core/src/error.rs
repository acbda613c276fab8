use thiserror::Error;

/// Error types for gateway operations against the identity provider and
/// the DICOMweb archive.
///
/// Only [`GatewayError::AuthenticationFailed`] is expected to reach a
/// caller of the aggregation layer; remote and parse failures are
/// recovered locally as empty or partial data by the components that
/// observe them.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The identity provider rejected the configured principal.
    /// Fatal to the requesting call path and never retried.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The archive returned a non-success status code.
    #[error("Remote archive unavailable: status {status}")]
    RemoteUnavailable { status: u16 },

    /// A transport-level failure (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The remote returned a body that could not be parsed.
    #[error("Invalid response from remote: {0}")]
    InvalidResponse(String),

    /// Invalid gateway configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Create a new AuthenticationFailed error
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed(message.into())
    }

    /// Create a new RemoteUnavailable error
    pub fn remote_unavailable(status: u16) -> Self {
        Self::RemoteUnavailable { status }
    }

    /// Create a new Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a new InvalidResponse error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns `true` if this is an authentication failure.
    ///
    /// Authentication failures are the only errors allowed to propagate
    /// out of the aggregation layer.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Returns `true` if this is a remote or transport failure that the
    /// fetch layer recovers from with empty or partial data.
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable { .. } | Self::Network(_) | Self::InvalidResponse(_)
        )
    }
}

/// Convenience result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
