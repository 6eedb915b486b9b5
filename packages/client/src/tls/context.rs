//! Encryption contexts and the factories that build them
//!
//! An [`EncryptionContext`] is the shared client configuration a handshake
//! runs with. It is built before any socket is opened, so a broken trust
//! setup never costs a network round trip.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use rustls::pki_types::CertificateDer;
use rustls::{ClientConfig, RootCertStore};

use super::errors::TlsError;
use crate::config::{TlsProtocol, TrustSettings};

/// Client-side encryption configuration shared by handshakes.
#[derive(Clone)]
pub struct EncryptionContext {
    config: Arc<ClientConfig>,
}

impl EncryptionContext {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }

    /// Builds a context trusting `roots` and negotiating only `protocols`.
    ///
    /// An empty protocol list allows every supported version.
    pub fn with_roots(roots: RootCertStore, protocols: &[TlsProtocol]) -> Result<Self, TlsError> {
        let versions: Vec<_> = if protocols.is_empty() {
            TlsProtocol::ALL.iter().map(|p| p.version()).collect()
        } else {
            protocols.iter().map(|p| p.version()).collect()
        };

        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_protocol_versions(&versions)?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self::new(Arc::new(config)))
    }

    pub fn config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }
}

impl fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionContext").finish_non_exhaustive()
    }
}

/// Produces the encryption context for an attempt.
pub trait EncryptionContextFactory {
    fn context(&self, trust: &TrustSettings) -> Result<EncryptionContext, TlsError>;
}

impl<T: EncryptionContextFactory + ?Sized> EncryptionContextFactory for &T {
    fn context(&self, trust: &TrustSettings) -> Result<EncryptionContext, TlsError> {
        (**self).context(trust)
    }
}

/// Builds contexts from [`TrustSettings`] with rustls.
///
/// Roots come from the configured CA file plus, when enabled, the platform
/// store. If the platform store reports load errors the bundled webpki roots
/// are added as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustlsContextFactory;

impl EncryptionContextFactory for RustlsContextFactory {
    fn context(&self, trust: &TrustSettings) -> Result<EncryptionContext, TlsError> {
        let mut roots = RootCertStore::empty();

        if let Some(path) = &trust.ca_file {
            let added = add_pem_file(&mut roots, path)?;
            tracing::debug!(path = %path.display(), added, "loaded CA file");
        }

        if trust.use_system_roots {
            let system = system_roots();
            let (added, ignored) = roots.add_parsable_certificates(system.certs.iter().cloned());
            if system.needs_fallback {
                roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            }
            tracing::debug!(added, ignored, fallback = system.needs_fallback, "loaded system root certificates");
        }

        if roots.is_empty() {
            return Err(TlsError::NoTrustRoots);
        }

        EncryptionContext::with_roots(roots, &trust.protocols)
    }
}

/// Returns the same context for every attempt.
#[derive(Debug, Clone)]
pub struct StaticContextFactory {
    context: EncryptionContext,
}

impl StaticContextFactory {
    pub fn new(context: EncryptionContext) -> Self {
        Self { context }
    }
}

impl EncryptionContextFactory for StaticContextFactory {
    fn context(&self, _trust: &TrustSettings) -> Result<EncryptionContext, TlsError> {
        Ok(self.context.clone())
    }
}

fn add_pem_file(roots: &mut RootCertStore, path: &Path) -> Result<usize, TlsError> {
    let ca_error = |source| TlsError::CaFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(ca_error)?;
    let mut reader = BufReader::new(file);

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ca_error)?;
    if certs.is_empty() {
        return Err(TlsError::EmptyCaFile(path.to_path_buf()));
    }

    let count = certs.len();
    for cert in certs {
        roots
            .add(cert)
            .map_err(|e| TlsError::InvalidCertificate(e.to_string()))?;
    }
    Ok(count)
}

/// Platform roots, loaded once per process.
struct SystemRoots {
    certs: Vec<CertificateDer<'static>>,
    /// Set when the platform store reported load errors.
    needs_fallback: bool,
}

fn system_roots() -> &'static SystemRoots {
    static ROOTS: OnceLock<SystemRoots> = OnceLock::new();
    ROOTS.get_or_init(|| {
        let result = rustls_native_certs::load_native_certs();
        for err in &result.errors {
            tracing::warn!(error = %err, "certificate load error");
        }
        SystemRoots {
            certs: result.certs,
            needs_fallback: !result.errors.is_empty(),
        }
    })
}
