//! Socket abstraction used by the connection establisher
//!
//! [`TransportSocket`] is the unconnected socket object an attempt configures,
//! binds and connects. [`SystemSocket`] is the OS-backed implementation on
//! `socket2`; tests and embedders can supply their own through a
//! [`SocketFactory`].

use std::cell::Cell;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::config::PerformancePreferences;

/// An unconnected stream socket that can be tuned, bound and connected.
pub trait TransportSocket {
    /// Byte stream produced once the socket is connected.
    type Stream: Read + Write;

    fn set_tcp_nodelay(&self, enabled: bool) -> io::Result<()>;

    fn set_keepalive(&self, enabled: bool) -> io::Result<()>;

    /// `None` blocks reads indefinitely.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Implementations may treat the triple as a hint and only record it.
    fn set_performance_preferences(&self, prefs: PerformancePreferences) -> io::Result<()>;

    fn set_recv_buffer_size(&self, size: usize) -> io::Result<()>;

    fn set_send_buffer_size(&self, size: usize) -> io::Result<()>;

    fn bind(&self, local: SocketAddr) -> io::Result<()>;

    /// Connects to `remote`, waiting at most `timeout` when one is given.
    fn connect(&self, remote: SocketAddr, timeout: Option<Duration>) -> io::Result<()>;

    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// Converts the connected socket into its byte stream.
    fn into_stream(self) -> Self::Stream;
}

/// Creates sockets suitable for reaching a given remote address.
pub trait SocketFactory {
    type Socket: TransportSocket;

    fn create(&self, remote: SocketAddr) -> io::Result<Self::Socket>;
}

impl<F: SocketFactory + ?Sized> SocketFactory for &F {
    type Socket = F::Socket;

    fn create(&self, remote: SocketAddr) -> io::Result<Self::Socket> {
        (**self).create(remote)
    }
}

/// Blocking TCP socket backed by the operating system.
#[derive(Debug)]
pub struct SystemSocket {
    socket: Socket,
    preferences: Cell<Option<PerformancePreferences>>,
}

impl SystemSocket {
    /// Creates a TCP socket in the address family of `remote`.
    pub fn for_remote(remote: SocketAddr) -> io::Result<Self> {
        let socket = Socket::new(Domain::for_address(remote), Type::STREAM, Some(Protocol::TCP))?;
        Ok(Self {
            socket,
            preferences: Cell::new(None),
        })
    }

    /// Preferences recorded on this socket.
    ///
    /// No portable socket knob exists for them, so they are kept as a hint
    /// for whatever owns the socket.
    pub fn performance_preferences(&self) -> Option<PerformancePreferences> {
        self.preferences.get()
    }

    pub fn as_socket(&self) -> &Socket {
        &self.socket
    }
}

impl TransportSocket for SystemSocket {
    type Stream = TcpStream;

    fn set_tcp_nodelay(&self, enabled: bool) -> io::Result<()> {
        self.socket.set_tcp_nodelay(enabled)
    }

    fn set_keepalive(&self, enabled: bool) -> io::Result<()> {
        self.socket.set_keepalive(enabled)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.socket.set_read_timeout(timeout)
    }

    fn set_performance_preferences(&self, prefs: PerformancePreferences) -> io::Result<()> {
        self.preferences.set(Some(prefs));
        Ok(())
    }

    fn set_recv_buffer_size(&self, size: usize) -> io::Result<()> {
        self.socket.set_recv_buffer_size(size)
    }

    fn set_send_buffer_size(&self, size: usize) -> io::Result<()> {
        self.socket.set_send_buffer_size(size)
    }

    fn bind(&self, local: SocketAddr) -> io::Result<()> {
        self.socket.bind(&SockAddr::from(local))
    }

    fn connect(&self, remote: SocketAddr, timeout: Option<Duration>) -> io::Result<()> {
        let remote = SockAddr::from(remote);
        match timeout {
            Some(timeout) => self.socket.connect_timeout(&remote, timeout),
            None => self.socket.connect(&remote),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()?.as_socket().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Unsupported, "local address is not an IP address")
        })
    }

    fn into_stream(self) -> TcpStream {
        self.socket.into()
    }
}

/// Factory for [`SystemSocket`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSocketFactory;

impl SocketFactory for SystemSocketFactory {
    type Socket = SystemSocket;

    fn create(&self, remote: SocketAddr) -> io::Result<SystemSocket> {
        SystemSocket::for_remote(remote)
    }
}

/// Stream type produced by the sockets of factory `F`.
pub type StreamOf<F> = <<F as SocketFactory>::Socket as TransportSocket>::Stream;
