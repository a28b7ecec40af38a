//! Client configuration.

use crate::{ClientError, Result};
use std::time::Duration;

/// Default overall request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const ENV_PREFIX: &str = "MERIDIAN";

/// Client configuration.
///
/// Resolved once when the client is built and immutable afterwards. A zero
/// timeout means "use the default".
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overall request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// TLS settings. When present, endpoints are contacted over https.
    pub tls: Option<TlsConfig>,
    /// Dispatcher receiving the client's log events. Falls back to the
    /// process default subscriber when unset.
    pub logger: Option<tracing::Dispatch>,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip response decompression.
    pub gzip: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            tls: None,
            logger: None,
            user_agent: format!("meridian-client/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load overrides from `MERIDIAN_*` environment variables.
    ///
    /// Recognized: `MERIDIAN_TIMEOUT_MS`, `MERIDIAN_CONNECT_TIMEOUT_MS`,
    /// `MERIDIAN_USER_AGENT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));
        let mut config = Self::default();

        if let Some(value) = var("TIMEOUT_MS") {
            config.timeout = parse_millis("TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("CONNECT_TIMEOUT_MS") {
            config.connect_timeout = parse_millis("CONNECT_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("USER_AGENT") {
            config.user_agent = value;
        }

        Ok(config.resolved())
    }

    /// Replace zero timeouts with their defaults.
    pub fn resolved(mut self) -> Self {
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.connect_timeout.is_zero() {
            self.connect_timeout = DEFAULT_CONNECT_TIMEOUT;
        }
        self
    }

    /// URL scheme used for every endpoint.
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() { "https" } else { "http" }
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ClientError::Config(format!("{}_{}={:?}: {}", ENV_PREFIX, name, value, e)))
}

/// Builder for client configuration.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Enable TLS with the given settings.
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = Some(tls);
        self
    }

    /// Send log events to a specific dispatcher.
    pub fn logger(mut self, dispatch: tracing::Dispatch) -> Self {
        self.config.logger = Some(dispatch);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip decompression.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config.resolved()
    }
}

/// TLS settings for endpoint connections.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Extra trusted roots, PEM encoded.
    pub root_certificates: Vec<Vec<u8>>,
    /// Client certificate chain and private key, PEM encoded.
    pub identity: Option<Vec<u8>>,
    /// Trust the bundled web PKI roots.
    pub built_in_roots: bool,
    /// Skip certificate verification. Only for tests.
    pub accept_invalid_certs: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            root_certificates: Vec::new(),
            identity: None,
            built_in_roots: true,
            accept_invalid_certs: false,
        }
    }
}

impl TlsConfig {
    /// TLS with the bundled roots only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust an additional PEM encoded root certificate.
    pub fn add_root_certificate_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.root_certificates.push(pem.into());
        self
    }

    /// Present a client identity (certificate chain followed by private key).
    pub fn identity_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.identity = Some(pem.into());
        self
    }

    /// Trust only explicitly added roots.
    pub fn without_built_in_roots(mut self) -> Self {
        self.built_in_roots = false;
        self
    }

    /// Disable certificate verification.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub(crate) fn apply(&self, builder: reqwest::ClientBuilder) -> Result<reqwest::ClientBuilder> {
        let mut builder = builder
            .use_rustls_tls()
            .tls_built_in_root_certs(self.built_in_roots)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        for pem in &self.root_certificates {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| ClientError::Config(format!("invalid root certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(pem) = &self.identity {
            let identity = reqwest::Identity::from_pem(pem)
                .map_err(|e| ClientError::Config(format!("invalid client identity: {}", e)))?;
            builder = builder.identity(identity);
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.tls.is_none());
        assert_eq!(config.scheme(), "http");
    }

    #[test]
    fn test_zero_durations_fall_back() {
        let config = ClientConfig::builder()
            .timeout(Duration::ZERO)
            .connect_timeout(Duration::ZERO)
            .build();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn test_tls_switches_scheme() {
        let config = ClientConfig::builder().tls(TlsConfig::new()).build();
        assert_eq!(config.scheme(), "https");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("MERIDIAN_TIMEOUT_MS", "2500"),
            ("MERIDIAN_USER_AGENT", "orders/1.0"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.user_agent, "orders/1.0");
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = ClientConfig::from_lookup(|key| {
            (key == "MERIDIAN_CONNECT_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
