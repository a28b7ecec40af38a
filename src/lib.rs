// Meridian - call HTTP services by name
//
// This library resolves logical service names to endpoints through a pluggable
// directory, rotates requests across them, and offers JSON/XML helpers.

// Re-export the client
pub use meridian_client::*;

// Re-export discovery for custom directory implementations
pub use meridian_discovery;

// Prelude for common imports
pub mod prelude {
    pub use meridian_client::prelude::*;
    pub use meridian_discovery::{ConsulDirectory, InMemoryDirectory};
}
