//! Client error types.

use meridian_discovery::DiscoveryError;
use std::fmt::Display;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures while building or carrying a request over the network.
///
/// The dispatcher does not distinguish between these any further; they are
/// all reported as [`ClientError::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The outbound request could not be constructed.
    #[error("failed to create HTTP request: {0}")]
    Build(String),

    /// Connect, TLS, write or read failure, including transport timeouts.
    #[error("failed to perform HTTP request: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller's context was canceled.
    #[error("context canceled")]
    Canceled,

    /// The caller's context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint directory could not resolve the service.
    #[error(transparent)]
    Resolution(#[from] DiscoveryError),

    /// The directory resolved the service to zero endpoints.
    #[error("no available endpoint for service {service}")]
    NoEndpoint {
        /// Service that had no endpoints.
        service: String,
    },

    /// The request could not be sent or the exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body could not be serialized. No request was sent.
    #[error("failed to marshal {media_type} request body: {message}")]
    Encode {
        /// Media type of the codec.
        media_type: &'static str,
        /// Serializer message.
        message: String,
    },

    /// A successful response body could not be deserialized.
    #[error("failed to decode {media_type} response: {message}")]
    Decode {
        /// Media type of the codec.
        media_type: &'static str,
        /// Deserializer message.
        message: String,
    },

    /// The response status was outside 200..300.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// Invalid client configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn encode(media_type: &'static str, err: impl Display) -> Self {
        Self::Encode {
            media_type,
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(media_type: &'static str, err: impl Display) -> Self {
        Self::Decode {
            media_type,
            message: err.to_string(),
        }
    }

    /// Check if this is a transport-class error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this error came from a timeout or an expired deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(TransportError::DeadlineExceeded) => true,
            Self::Transport(TransportError::Http(e)) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is the "service has zero live endpoints" condition.
    pub fn is_no_endpoint(&self) -> bool {
        matches!(self, Self::NoEndpoint { .. })
    }

    /// Get the HTTP status code if this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the raw response body if this is a status error.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}
