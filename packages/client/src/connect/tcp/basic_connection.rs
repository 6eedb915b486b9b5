//! Raw socket connection
//!
//! Runs the fixed sequence every attempt shares: create a socket, apply
//! options, bind an ephemeral local port, connect. Option failures are
//! advisory; every other step failing ends the attempt.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use super::dns_resolution::resolve_first;
use super::socket::{SocketFactory, StreamOf, TransportSocket};
use super::socket_config::{ApplyReport, configure_socket};
use crate::config::ConnectionOptions;
use crate::connect::types::AttemptState;
use crate::error::{Result, TransportError};

/// A socket connected to its remote endpoint.
#[derive(Debug)]
pub struct OpenedSocket<S> {
    pub stream: S,
    pub remote: SocketAddr,
    pub local: Option<SocketAddr>,
    pub report: ApplyReport,
}

/// Wildcard address of `remote`'s family with port 0.
pub fn ephemeral_local(remote: &SocketAddr) -> SocketAddr {
    let ip = match remote {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    SocketAddr::new(ip, 0)
}

/// Resolves `host` and connects a freshly created, configured socket to it.
pub fn open_socket<F: SocketFactory>(
    factory: &F,
    host: &str,
    port: u16,
    options: &ConnectionOptions,
) -> Result<OpenedSocket<StreamOf<F>>> {
    let remote = resolve_first(host, port).map_err(|source| TransportError::Resolve {
        endpoint: format!("{host}:{port}"),
        source,
    })?;

    let socket = factory
        .create(remote)
        .map_err(|source| TransportError::Create { remote, source })?;
    tracing::debug!(%remote, state = %AttemptState::Created, "socket created");

    let report = configure_socket(&socket, options);
    tracing::debug!(
        %remote,
        state = %AttemptState::Configured,
        applied = report.applied().len(),
        advisories = report.advisories().len(),
        "socket configured"
    );

    let local = ephemeral_local(&remote);
    socket
        .bind(local)
        .map_err(|source| TransportError::Bind { local, source })?;
    tracing::debug!(%remote, %local, state = %AttemptState::Bound, "socket bound");

    socket
        .connect(remote, options.connect_timeout)
        .map_err(|source| TransportError::Connect { remote, source })?;
    let local = socket.local_addr().ok();
    tracing::debug!(%remote, local = ?local, state = %AttemptState::Connected, "socket connected");

    Ok(OpenedSocket {
        stream: socket.into_stream(),
        remote,
        local,
        report,
    })
}
