//! Proxy-specific error types

use std::io;

/// Failure to interpret a proxy specification.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid proxy URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported proxy scheme {0:?}; only http proxies can tunnel")]
    UnsupportedScheme(String),
    #[error("proxy URL {0:?} has no host")]
    MissingHost(String),
    #[error("proxy credentials are not valid UTF-8")]
    InvalidCredentials,
}

/// Failure of the HTTP CONNECT exchange with a proxy.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("I/O error during CONNECT exchange: {0}")]
    Io(#[from] io::Error),
    #[error("proxy closed the connection before answering CONNECT")]
    Closed,
    #[error("malformed CONNECT response: {0:?}")]
    Malformed(String),
    #[error("proxy refused CONNECT with status {status} {reason}")]
    Rejected { status: u16, reason: String },
    #[error("CONNECT response headers exceed {limit} bytes")]
    HeadersTooLarge { limit: usize },
}
