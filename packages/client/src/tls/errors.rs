//! Encryption context error types

use std::io;
use std::path::PathBuf;

/// Failure to build an encryption context.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("no trusted root certificates available")]
    NoTrustRoots,
    #[error("failed to read CA file {}: {source}", path.display())]
    CaFile { path: PathBuf, source: io::Error },
    #[error("CA file {} contains no certificates", .0.display())]
    EmptyCaFile(PathBuf),
    #[error("invalid root certificate: {0}")]
    InvalidCertificate(String),
    #[error("TLS configuration rejected: {0}")]
    Protocol(#[from] rustls::Error),
}
