//! Connection establishment
//!
//! `tcp` holds the blocking building blocks, `types` the handles and the
//! [`Connector`] that sequences them.

pub mod tcp;
pub mod types;

pub use tcp::{
    AppliedOption, ApplyReport, SocketFactory, StreamOf, SystemSocket, SystemSocketFactory,
    TransportSocket, apply, configure_socket, establish_tunnel, upgrade,
};
pub use types::{
    AttemptState, ConnectPath, Connection, ConnectionTarget, Connector, EncryptedConnection,
    RawConnection, connect,
};
