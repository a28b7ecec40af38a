//! Endpoint model and the directory contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Endpoint directory errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Discovery backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// A resolved network location for one instance of a service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP address
    pub address: String,

    /// Port number
    pub port: u16,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// `address:port`, with IPv6 literals bracketed
    pub fn authority(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

/// Resolves a logical service name to its current endpoints.
///
/// Implementations must be safe to call concurrently. Callers make no
/// assumption about ordering or caching of the returned list, and an empty
/// list is a valid answer for a service that currently has no live instances.
#[async_trait]
pub trait EndpointDirectory: Send + Sync {
    /// Resolve the endpoints currently serving `service_name`
    async fn resolve(&self, service_name: &str) -> Result<Vec<Endpoint>, DiscoveryError>;
}

#[async_trait]
impl<D: EndpointDirectory + ?Sized> EndpointDirectory for Arc<D> {
    async fn resolve(&self, service_name: &str) -> Result<Vec<Endpoint>, DiscoveryError> {
        (**self).resolve(service_name).await
    }
}

#[async_trait]
impl<D: EndpointDirectory + ?Sized> EndpointDirectory for Box<D> {
    async fn resolve(&self, service_name: &str) -> Result<Vec<Endpoint>, DiscoveryError> {
        (**self).resolve(service_name).await
    }
}
