//! # rpcsock client
//!
//! Transport bootstrap for RPC clients. Establishes a byte-stream connection
//! to a remote endpoint, optionally tunneled through an HTTP proxy and
//! optionally upgraded to TLS, after applying low-level socket tuning.
//!
//! ## Connection paths
//!
//! | encrypted | proxied | sequence |
//! |---|---|---|
//! | no  | no  | configure, bind, connect to target |
//! | no  | yes | configure, bind, connect to proxy, CONNECT tunnel |
//! | yes | no  | configure, bind, connect to target, TLS handshake |
//! | yes | yes | configure, bind, connect to proxy, CONNECT tunnel, TLS handshake |
//!
//! Every path performs exactly one TCP handshake. Socket tuning failures are
//! advisory and never abort an attempt; bind, connect, tunnel and handshake
//! failures are fatal and surface as [`TransportError`].
//!
//! ## Usage
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::io::Write;
//!
//! use rpcsock_client::{connect, ConnectionOptions, ConnectionTarget, ProxyConfig};
//!
//! let mut config = HashMap::new();
//! config.insert("so-timeout".to_string(), "5000".to_string());
//!
//! let options = ConnectionOptions::from_config(&config);
//! let target = ConnectionTarget::new("rpc.example.com", 1666);
//!
//! let mut conn = connect(&target, &options, true, &ProxyConfig::none())?;
//! conn.write_all(b"hello")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod error;
pub mod proxy;
pub mod tls;

pub use config::{
    ConfigSource, ConnectionOptions, EnvConfig, PerformancePreferences, TlsProtocol, TrustSettings,
};
pub use connect::{
    AppliedOption, ApplyReport, AttemptState, ConnectPath, Connection, ConnectionTarget,
    Connector, EncryptedConnection, RawConnection, SocketFactory, StreamOf, SystemSocket,
    SystemSocketFactory, TransportSocket, apply, connect, upgrade,
};
pub use error::{AdvisoryError, Result, SocketOption, TransportError};
pub use proxy::{ProxyAuth, ProxyConfig, ProxyError, TunnelError};
pub use tls::{
    EncryptionContext, EncryptionContextFactory, RustlsContextFactory, StaticContextFactory,
    TlsError,
};
