//! # Meridian Client
//!
//! An HTTP client that sends requests to logical service names. Each call
//! resolves the name through an [`EndpointDirectory`], picks one endpoint in
//! round-robin order and sends a single request to it.
//!
//! ## Features
//!
//! - **Service Names**: Endpoints come from a pluggable directory (in-memory, Consul, custom)
//! - **Round Robin**: Per-service counters shared safely across concurrent callers
//! - **Contexts**: Cancellation and deadlines on every call
//! - **Timeouts & TLS**: Configured once per client
//! - **Codecs**: JSON and XML helpers with header defaulting and status classification
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meridian_client::{Client, ClientConfig, Context, Endpoint, HeaderMap, InMemoryDirectory};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = InMemoryDirectory::new();
//!     directory.register("users", Endpoint::new("10.0.0.1", 8080)).await;
//!     directory.register("users", Endpoint::new("10.0.0.2", 8080)).await;
//!
//!     let client = Client::new(directory, ClientConfig::default())?;
//!
//!     let user: User = client
//!         .json()
//!         .get(&Context::background(), "users", "/users/7", HeaderMap::new())
//!         .await?;
//!
//!     println!("{} {}", user.id, user.name);
//!     Ok(())
//! }
//! ```
//!
//! ## Raw Responses
//!
//! ```rust,no_run
//! use meridian_client::{Client, Context, HeaderMap, InMemoryDirectory};
//! use std::time::Duration;
//!
//! # async fn run(client: Client) -> meridian_client::Result<()> {
//! let ctx = Context::background().with_timeout(Duration::from_secs(2));
//! let response = client.get(&ctx, "reports", "/daily.csv", HeaderMap::new()).await?;
//! println!("{} from {}", response.status(), response.endpoint());
//! let body = response.bytes().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod codec;
mod config;
mod content;
mod context;
mod error;
mod request;
mod response;
mod rotation;

pub use client::Client;
pub use codec::{Codec, Json, MEDIA_JSON, MEDIA_XML, Xml};
pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, TlsConfig,
};
pub use content::CodecClient;
pub use context::Context;
pub use error::{ClientError, Result, TransportError};
pub use response::Response;
pub use rotation::RotationTable;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use meridian_discovery::{
    ConsulDirectory, DiscoveryError, Endpoint, EndpointDirectory, InMemoryDirectory,
};
pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
///
/// ```
/// use meridian_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::Client;
    pub use crate::codec::{Codec, Json, Xml};
    pub use crate::config::{ClientConfig, TlsConfig};
    pub use crate::context::Context;
    pub use crate::error::{ClientError, Result};
    pub use crate::response::Response;
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
    pub use meridian_discovery::{Endpoint, EndpointDirectory};
}
