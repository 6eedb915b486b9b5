//! Fluent RPC transport API
//!
//! Builder front end over [`rpcsock_client`]: describe the endpoint, tuning,
//! proxy and encryption, then connect. Blocking by default, with an async
//! entry point that runs the attempt on the runtime's blocking pool.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

pub use builder::*;

// Re-export important types from the client package
pub use rpcsock_client::{
    AttemptState, ConfigSource, Connection, ConnectionOptions, ConnectionTarget, EncryptionContext,
    EncryptionContextFactory, EnvConfig, PerformancePreferences, ProxyConfig, ProxyError,
    RustlsContextFactory, TlsProtocol, TransportError, TrustSettings,
};

/// Main entry point providing static builder methods
pub struct Transport;

impl Transport {
    /// Start building a transport to `host:port`
    ///
    /// Shorthand for `TransportBuilder::new(host, port)`
    pub fn to(host: impl Into<String>, port: u16) -> TransportBuilder {
        TransportBuilder::new(host, port)
    }

    /// Start building an encrypted transport to `host:port`
    pub fn secure(host: impl Into<String>, port: u16) -> TransportBuilder {
        TransportBuilder::new(host, port).encrypted()
    }
}

/// Start building a transport to `host:port`
///
/// Shorthand for `Transport::to(host, port)`
pub fn to(host: impl Into<String>, port: u16) -> TransportBuilder {
    Transport::to(host, port)
}
