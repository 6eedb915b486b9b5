//! Blocking TCP connection building blocks
//!
//! Socket abstraction, option application, name resolution, the raw connect
//! sequence, HTTP CONNECT tunneling and the encryption upgrade.

pub mod basic_connection;
pub mod dns_resolution;
pub mod http_connect;
pub mod socket;
pub mod socket_config;
pub mod tls;

pub use basic_connection::{OpenedSocket, open_socket};
pub use dns_resolution::resolve_first;
pub use http_connect::establish_tunnel;
pub use socket::{SocketFactory, StreamOf, SystemSocket, SystemSocketFactory, TransportSocket};
pub use socket_config::{AppliedOption, ApplyReport, apply, configure_socket, keepalive_enabled};
pub use tls::upgrade;
