//! Consul-backed endpoint directory

use crate::endpoint::{DiscoveryError, Endpoint, EndpointDirectory};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Header carrying the Consul ACL token
const CONSUL_TOKEN_HEADER: &str = "X-Consul-Token";

/// Endpoint directory backed by the Consul health API
///
/// Only instances whose health checks are passing are returned.
#[derive(Clone)]
pub struct ConsulDirectory {
    base_url: Url,
    client: reqwest::Client,
    datacenter: Option<String>,
    tags: Vec<String>,
    token: Option<String>,
}

#[derive(Deserialize)]
struct HealthEntry {
    #[serde(rename = "Node")]
    node: NodeDetail,
    #[serde(rename = "Service")]
    service: ServiceDetail,
}

#[derive(Deserialize)]
struct NodeDetail {
    #[serde(rename = "Address")]
    address: String,
}

#[derive(Deserialize)]
struct ServiceDetail {
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "Port")]
    port: u16,
}

impl ConsulDirectory {
    /// Create new Consul directory
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use meridian_discovery::ConsulDirectory;
    ///
    /// let consul = ConsulDirectory::new("http://localhost:8500")?
    ///     .with_datacenter("dc1")
    ///     .with_tag("v2");
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, DiscoveryError> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| DiscoveryError::InvalidConfiguration(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DiscoveryError::InvalidConfiguration(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
            datacenter: None,
            tags: Vec::new(),
            token: None,
        })
    }

    /// Query a specific datacenter instead of the agent's own
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    /// Only return instances carrying this tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Authenticate with an ACL token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a preconfigured HTTP client for talking to Consul
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn health_url(&self, service_name: &str) -> Result<Url, DiscoveryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DiscoveryError::InvalidConfiguration(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v1", "health", "service", service_name]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("passing", "true");
            if let Some(dc) = &self.datacenter {
                query.append_pair("dc", dc);
            }
            for tag in &self.tags {
                query.append_pair("tag", tag);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl EndpointDirectory for ConsulDirectory {
    async fn resolve(&self, service_name: &str) -> Result<Vec<Endpoint>, DiscoveryError> {
        let url = self.health_url(service_name)?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(CONSUL_TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DiscoveryError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let entries: Vec<HealthEntry> = response.json().await?;

        let endpoints: Vec<Endpoint> = entries
            .into_iter()
            .map(|entry| {
                // Consul leaves the service address empty when it matches the node
                let address = if entry.service.address.is_empty() {
                    entry.node.address
                } else {
                    entry.service.address
                };
                Endpoint::new(address, entry.service.port)
            })
            .collect();

        debug!(
            service = %service_name,
            count = endpoints.len(),
            "Resolved endpoints from Consul"
        );
        Ok(endpoints)
    }
}
