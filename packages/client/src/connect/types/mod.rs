//! Connection types
//!
//! - `target`: endpoints, path selection and attempt states
//! - `connection`: raw and caller-facing transport handles
//! - `tls_connection`: the encrypted handle
//! - `connector`: the connection establisher

pub mod connection;
pub mod connector;
pub mod target;
pub mod tls_connection;

pub use connection::{Connection, RawConnection};
pub use connector::{Connector, connect};
pub use target::{AttemptState, ConnectPath, ConnectionTarget};
pub use tls_connection::EncryptedConnection;
