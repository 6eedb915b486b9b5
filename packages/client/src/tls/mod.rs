//! Encryption contexts for the upgrade step
//!
//! Certificate trust evaluation itself is rustls's job; this module only
//! decides which roots and protocol versions a context carries.

pub mod context;
pub mod errors;

pub use context::{
    EncryptionContext, EncryptionContextFactory, RustlsContextFactory, StaticContextFactory,
};
pub use errors::TlsError;
