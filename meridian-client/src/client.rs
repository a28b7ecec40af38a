//! Service-name HTTP client and request dispatch.

use http::{HeaderMap, Method};
use meridian_discovery::{Endpoint, EndpointDirectory};
use std::sync::Arc;
use tracing::debug;

use crate::request::OutboundRequest;
use crate::{
    ClientConfig, ClientError, Codec, CodecClient, Context, Json, Response, Result, RotationTable,
    TransportError, Xml,
};

/// HTTP client that addresses services by name.
///
/// Every call resolves the service through the endpoint directory, picks one
/// endpoint round-robin and sends exactly one request to it. Cloning is cheap
/// and clones share the rotation state and the connection pool.
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    directory: Arc<dyn EndpointDirectory>,
    rotation: Arc<RotationTable>,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Create a new client resolving services through `directory`.
    pub fn new(directory: impl EndpointDirectory + 'static, config: ClientConfig) -> Result<Self> {
        let config = config.resolved();

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.gzip);

        if let Some(tls) = &config.tls {
            builder = tls.apply(builder)?;
        }

        let inner = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            directory: Arc::new(directory),
            rotation: Arc::new(RotationTable::new()),
            config: Arc::new(config),
        })
    }

    /// Create a new client with default configuration.
    pub fn with_directory(directory: impl EndpointDirectory + 'static) -> Result<Self> {
        Self::new(directory, ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the round-robin state.
    pub fn rotation(&self) -> &RotationTable {
        &self.rotation
    }

    /// JSON helpers.
    pub fn json(&self) -> CodecClient<'_, Json> {
        CodecClient::new(self, Json)
    }

    /// XML helpers.
    pub fn xml(&self) -> CodecClient<'_, Xml> {
        CodecClient::new(self, Xml)
    }

    /// Helpers for a custom codec.
    pub fn codec<C: Codec>(&self, codec: C) -> CodecClient<'_, C> {
        CodecClient::new(self, codec)
    }

    /// Send a GET request and return the live response.
    pub async fn get(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        headers: HeaderMap,
    ) -> Result<Response> {
        self.execute(ctx, service_name, Method::GET, path, None, headers)
            .await
    }

    /// Send a POST request and return the live response.
    pub async fn post(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        body: impl Into<Vec<u8>>,
        headers: HeaderMap,
    ) -> Result<Response> {
        self.execute(ctx, service_name, Method::POST, path, Some(body.into()), headers)
            .await
    }

    /// Send a PUT request and return the live response.
    pub async fn put(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        body: impl Into<Vec<u8>>,
        headers: HeaderMap,
    ) -> Result<Response> {
        self.execute(ctx, service_name, Method::PUT, path, Some(body.into()), headers)
            .await
    }

    /// Send a DELETE request and return the live response.
    pub async fn delete(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        headers: HeaderMap,
    ) -> Result<Response> {
        self.execute(ctx, service_name, Method::DELETE, path, None, headers)
            .await
    }

    /// Resolve `service_name`, pick an endpoint and send one request to it.
    ///
    /// `path` is appended to the endpoint verbatim and must carry its leading
    /// slash and any query string. Dot segments (`.` and `..`) are resolved
    /// while the URL is parsed, so `/a/../b` is sent as `/b`. No retry or
    /// failover is attempted.
    pub async fn execute(
        &self,
        ctx: &Context,
        service_name: &str,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        headers: HeaderMap,
    ) -> Result<Response> {
        let endpoints = ctx.run(self.directory.resolve(service_name)).await??;

        self.emit(|| {
            debug!(
                service = %service_name,
                endpoints = %format_endpoints(&endpoints),
                "Resolved endpoints"
            )
        });

        let endpoint = self
            .rotation
            .select_next(service_name, &endpoints)
            .cloned()
            .ok_or_else(|| ClientError::NoEndpoint {
                service: service_name.to_string(),
            })?;

        self.emit(|| {
            debug!(
                service = %service_name,
                endpoint = %endpoint,
                method = %method,
                "Chose endpoint"
            )
        });

        let request = OutboundRequest::new(method, path, body, headers).build(
            &self.inner,
            self.config.scheme(),
            &endpoint,
        )?;

        let response = ctx
            .run(self.inner.execute(request))
            .await?
            .map_err(TransportError::Http)?;

        self.emit(|| {
            debug!(
                service = %service_name,
                endpoint = %endpoint,
                status = response.status().as_u16(),
                "Received response"
            )
        });

        Ok(Response::new(response, endpoint))
    }

    /// Emit log events to the configured dispatcher, or the default one.
    fn emit(&self, event: impl FnOnce()) {
        match &self.config.logger {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, event),
            None => event(),
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("rotation", &self.rotation)
            .finish_non_exhaustive()
    }
}

fn format_endpoints(endpoints: &[Endpoint]) -> String {
    endpoints
        .iter()
        .map(Endpoint::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
