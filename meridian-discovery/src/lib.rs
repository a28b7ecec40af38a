//! Endpoint Discovery for Meridian
//!
//! This crate resolves logical service names to the network endpoints that
//! currently serve them.
//!
//! ## Features
//!
//! - **Endpoint Directory** - One async trait, `EndpointDirectory`, consumed by the client
//! - **In-Memory** - Static or test topologies
//! - **Consul** - Passing instances from the Consul health API
//!
//! ## Quick Start
//!
//! ### In-Memory Directory (Testing)
//!
//! ```rust,ignore
//! use meridian_discovery::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = InMemoryDirectory::new();
//!     directory.register("api", Endpoint::new("10.0.0.1", 8080)).await;
//!
//!     for endpoint in directory.resolve("api").await? {
//!         println!("Found: {}", endpoint);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Consul Directory
//!
//! ```rust,ignore
//! use meridian_discovery::*;
//!
//! let consul = ConsulDirectory::new("http://localhost:8500")?;
//! let endpoints = consul.resolve("api").await?;
//! ```

pub mod consul;
pub mod endpoint;
pub mod memory;

pub use consul::ConsulDirectory;
pub use endpoint::{DiscoveryError, Endpoint, EndpointDirectory};
pub use memory::InMemoryDirectory;
