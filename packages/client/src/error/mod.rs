//! Error taxonomy for connection establishment
//!
//! Two disjoint kinds: fatal [`TransportError`]s abandon the attempt and
//! propagate to the caller, advisory [`AdvisoryError`]s are logged and
//! recorded while the attempt continues with the platform default.

pub mod classification;
pub mod types;

pub use types::{AdvisoryError, SocketOption, TransportError};

/// A Result alias where the Err case is [`TransportError`].
pub type Result<T> = std::result::Result<T, TransportError>;
