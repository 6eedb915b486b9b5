//! Encrypted transport handle
//!
//! Wraps a rustls client session layered over a connected [`RawConnection`]
//! stream. The handshake has already completed when one of these exists.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

use rustls::{ClientConnection, ProtocolVersion, StreamOwned};

use super::connection::RawConnection;
use super::target::ConnectionTarget;
use crate::config::TlsProtocol;

/// A TLS session over an already connected byte stream.
#[derive(Debug)]
pub struct EncryptedConnection<S: Read + Write = TcpStream> {
    stream: StreamOwned<ClientConnection, S>,
    target: ConnectionTarget,
    peer_addr: SocketAddr,
    local_addr: Option<SocketAddr>,
    proxied: bool,
}

impl<S: Read + Write> EncryptedConnection<S> {
    /// Takes over the stream and metadata of `raw` once `session` has
    /// finished its handshake over it.
    pub(crate) fn layer(raw: RawConnection<S>, session: ClientConnection) -> Self {
        let RawConnection {
            stream,
            target,
            peer_addr,
            local_addr,
            proxied,
        } = raw;
        Self {
            stream: StreamOwned::new(session, stream),
            target,
            peer_addr,
            local_addr,
            proxied,
        }
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_proxied(&self) -> bool {
        self.proxied
    }

    /// Protocol version agreed during the handshake.
    pub fn protocol(&self) -> Option<TlsProtocol> {
        match self.stream.conn.protocol_version()? {
            ProtocolVersion::TLSv1_2 => Some(TlsProtocol::Tls12),
            ProtocolVersion::TLSv1_3 => Some(TlsProtocol::Tls13),
            _ => None,
        }
    }

    pub fn session(&self) -> &ClientConnection {
        &self.stream.conn
    }

    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }
}

impl<S: Read + Write> Read for EncryptedConnection<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl<S: Read + Write> Write for EncryptedConnection<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
