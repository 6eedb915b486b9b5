//! Connected transport handles
//!
//! A [`RawConnection`] is a connected byte stream (possibly tunneled through
//! a proxy). Encrypted attempts consume it to produce an
//! [`EncryptedConnection`]. [`Connection`] is what callers receive; it reads
//! and writes the same way whichever path produced it.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

use super::target::{AttemptState, ConnectionTarget};
use super::tls_connection::EncryptedConnection;

/// A connected, not yet encrypted byte stream.
#[derive(Debug)]
pub struct RawConnection<S = TcpStream> {
    pub(crate) stream: S,
    pub(crate) target: ConnectionTarget,
    pub(crate) peer_addr: SocketAddr,
    pub(crate) local_addr: Option<SocketAddr>,
    pub(crate) proxied: bool,
}

impl<S> RawConnection<S> {
    pub(crate) fn new(
        stream: S,
        target: ConnectionTarget,
        peer_addr: SocketAddr,
        local_addr: Option<SocketAddr>,
        proxied: bool,
    ) -> Self {
        Self {
            stream,
            target,
            peer_addr,
            local_addr,
            proxied,
        }
    }

    /// The endpoint this connection carries traffic to.
    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    /// Address of the socket peer: the proxy when tunneled, else the target.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_proxied(&self) -> bool {
        self.proxied
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read> Read for RawConnection<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl<S: Write> Write for RawConnection<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Ready transport handle returned by a successful attempt.
#[derive(Debug)]
pub enum Connection<S: Read + Write = TcpStream> {
    Plain(RawConnection<S>),
    Encrypted(Box<EncryptedConnection<S>>),
}

impl<S: Read + Write> Connection<S> {
    pub fn target(&self) -> &ConnectionTarget {
        match self {
            Connection::Plain(raw) => raw.target(),
            Connection::Encrypted(tls) => tls.target(),
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        match self {
            Connection::Plain(raw) => raw.peer_addr(),
            Connection::Encrypted(tls) => tls.peer_addr(),
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            Connection::Plain(raw) => raw.local_addr(),
            Connection::Encrypted(tls) => tls.local_addr(),
        }
    }

    pub fn is_proxied(&self) -> bool {
        match self {
            Connection::Plain(raw) => raw.is_proxied(),
            Connection::Encrypted(tls) => tls.is_proxied(),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Connection::Encrypted(_))
    }

    /// Terminal state reached by the attempt that produced this handle.
    pub fn state(&self) -> AttemptState {
        match self {
            Connection::Plain(_) => AttemptState::Connected,
            Connection::Encrypted(_) => AttemptState::Upgraded,
        }
    }
}

impl<S: Read + Write> Read for Connection<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(raw) => raw.read(buf),
            Connection::Encrypted(tls) => tls.read(buf),
        }
    }
}

impl<S: Read + Write> Write for Connection<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(raw) => raw.write(buf),
            Connection::Encrypted(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Plain(raw) => raw.flush(),
            Connection::Encrypted(tls) => tls.flush(),
        }
    }
}

impl<S: Read + Write> From<RawConnection<S>> for Connection<S> {
    fn from(raw: RawConnection<S>) -> Self {
        Connection::Plain(raw)
    }
}

impl<S: Read + Write> From<EncryptedConnection<S>> for Connection<S> {
    fn from(tls: EncryptedConnection<S>) -> Self {
        Connection::Encrypted(Box::new(tls))
    }
}
