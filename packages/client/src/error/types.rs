use std::fmt;
use std::io;
use std::net::SocketAddr;

use crate::connect::types::ConnectionTarget;
use crate::proxy::TunnelError;
use crate::tls::TlsError;

/// Fatal failure of a connection attempt.
///
/// Exactly one of these is reported per failed attempt, describing the first
/// unrecoverable step. No partially initialized handle accompanies it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },

    #[error("failed to create socket for {remote}: {source}")]
    Create { remote: SocketAddr, source: io::Error },

    #[error("failed to bind local address {local}: {source}")]
    Bind { local: SocketAddr, source: io::Error },

    #[error("failed to connect to {remote}: {source}")]
    Connect { remote: SocketAddr, source: io::Error },

    #[error("proxy {proxy} could not tunnel to {target}: {source}")]
    Tunnel {
        proxy: String,
        target: ConnectionTarget,
        source: TunnelError,
    },

    #[error("failed to build encryption context: {0}")]
    EncryptionContext(#[from] TlsError),

    #[error("invalid server name {host:?} for encryption handshake")]
    ServerName { host: String },

    #[error("encryption handshake with {target} failed: {source}")]
    Handshake {
        target: ConnectionTarget,
        source: io::Error,
    },
}

/// Socket options the applier knows how to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketOption {
    TcpNoDelay,
    ReadTimeout,
    KeepAlive,
    PerformancePreferences,
    RecvBufferSize,
    SendBufferSize,
}

impl SocketOption {
    pub fn as_str(self) -> &'static str {
        match self {
            SocketOption::TcpNoDelay => "TCP_NODELAY",
            SocketOption::ReadTimeout => "SO_TIMEOUT",
            SocketOption::KeepAlive => "SO_KEEPALIVE",
            SocketOption::PerformancePreferences => "performance preferences",
            SocketOption::RecvBufferSize => "SO_RCVBUF",
            SocketOption::SendBufferSize => "SO_SNDBUF",
        }
    }
}

impl fmt::Display for SocketOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal failure to apply a single socket option.
#[derive(Debug, thiserror::Error)]
#[error("failed to set {option}: {source}")]
pub struct AdvisoryError {
    pub option: SocketOption,
    pub source: io::Error,
}

impl AdvisoryError {
    pub fn new(option: SocketOption, source: io::Error) -> Self {
        Self { option, source }
    }
}
