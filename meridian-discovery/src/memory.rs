//! In-memory endpoint directory (for testing and static topologies)

use crate::endpoint::{DiscoveryError, Endpoint, EndpointDirectory};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, trace};

/// In-memory endpoint directory
///
/// A service name that was never registered fails to resolve. A known service
/// whose endpoints have all been removed resolves to an empty list.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    services: Arc<RwLock<HashMap<String, Vec<Endpoint>>>>,
}

impl InMemoryDirectory {
    /// Create new in-memory directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an endpoint to a service, creating the service if needed
    pub async fn register(&self, service_name: &str, endpoint: Endpoint) {
        let mut services = self.services.write().await;
        let endpoints = services.entry(service_name.to_string()).or_default();
        if !endpoints.contains(&endpoint) {
            info!(service = %service_name, endpoint = %endpoint, "Registered endpoint");
            endpoints.push(endpoint);
        }
    }

    /// Remove an endpoint from a service. The service itself stays known.
    pub async fn deregister(
        &self,
        service_name: &str,
        endpoint: &Endpoint,
    ) -> Result<(), DiscoveryError> {
        let mut services = self.services.write().await;
        let endpoints = services
            .get_mut(service_name)
            .ok_or_else(|| DiscoveryError::ServiceNotFound(service_name.to_string()))?;
        endpoints.retain(|e| e != endpoint);
        info!(service = %service_name, endpoint = %endpoint, "Deregistered endpoint");
        Ok(())
    }

    /// Replace the endpoint list of a service
    pub async fn set_endpoints(&self, service_name: &str, endpoints: Vec<Endpoint>) {
        self.services
            .write()
            .await
            .insert(service_name.to_string(), endpoints);
    }

    /// Forget a service entirely
    pub async fn remove_service(&self, service_name: &str) -> bool {
        self.services.write().await.remove(service_name).is_some()
    }

    /// Known service names, sorted
    pub async fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl EndpointDirectory for InMemoryDirectory {
    async fn resolve(&self, service_name: &str) -> Result<Vec<Endpoint>, DiscoveryError> {
        let services = self.services.read().await;
        let endpoints = services
            .get(service_name)
            .cloned()
            .ok_or_else(|| DiscoveryError::ServiceNotFound(service_name.to_string()))?;

        trace!(service = %service_name, count = endpoints.len(), "Resolved from memory");
        Ok(endpoints)
    }
}
