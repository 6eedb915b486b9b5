//! HTTP proxy configuration
//!
//! [`ProxyConfig`] is an immutable value handed to a connector when it is
//! built. An unset host means direct connections.

pub mod errors;
pub mod types;
pub mod url_handling;

pub use errors::{ProxyError, TunnelError};
pub use types::{ProxyAuth, ProxyConfig};
