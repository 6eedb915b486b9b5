//! Connection establisher
//!
//! [`Connector`] picks one of four paths from (encrypted, proxied) and runs
//! it. Every path opens exactly one socket with the same sequence:
//! configure, bind an ephemeral local port, connect. A proxied path then
//! tunnels with HTTP CONNECT over that socket, and an encrypted path layers
//! a handshake over whatever stream the raw phase produced.

use super::connection::{Connection, RawConnection};
use super::target::{ConnectPath, ConnectionTarget};
use super::tls_connection::EncryptedConnection;
use crate::config::ConnectionOptions;
use crate::connect::tcp::basic_connection::open_socket;
use crate::connect::tcp::http_connect::establish_tunnel;
use crate::connect::tcp::socket::{SocketFactory, StreamOf, SystemSocketFactory};
use crate::connect::tcp::tls;
use crate::error::{Result, TransportError};
use crate::proxy::ProxyConfig;
use crate::tls::{EncryptionContextFactory, RustlsContextFactory};

/// Establishes connections through an optional HTTP proxy.
///
/// The proxy is fixed for the connector's lifetime; attempts only read it.
#[derive(Debug, Clone)]
pub struct Connector<F = SystemSocketFactory, E = RustlsContextFactory> {
    proxy: ProxyConfig,
    sockets: F,
    encryption: E,
}

impl Connector {
    pub fn new(proxy: ProxyConfig) -> Self {
        Self::with_parts(proxy, SystemSocketFactory, RustlsContextFactory)
    }
}

impl Default for Connector {
    fn default() -> Self {
        Self::new(ProxyConfig::none())
    }
}

impl<F, E> Connector<F, E> {
    pub fn with_parts(proxy: ProxyConfig, sockets: F, encryption: E) -> Self {
        Self {
            proxy,
            sockets,
            encryption,
        }
    }

    pub fn with_socket_factory<G>(self, sockets: G) -> Connector<G, E> {
        Connector {
            proxy: self.proxy,
            sockets,
            encryption: self.encryption,
        }
    }

    pub fn with_encryption<G>(self, encryption: G) -> Connector<F, G> {
        Connector {
            proxy: self.proxy,
            sockets: self.sockets,
            encryption,
        }
    }

    pub fn proxy(&self) -> &ProxyConfig {
        &self.proxy
    }

    pub fn socket_factory(&self) -> &F {
        &self.sockets
    }
}

impl<F: SocketFactory, E: EncryptionContextFactory> Connector<F, E> {
    /// Opens the byte stream to `target`, tunneled when a proxy is set.
    ///
    /// Exactly one socket is created and connected: to the proxy when one is
    /// configured, otherwise to the target itself.
    pub fn raw_connect(
        &self,
        target: &ConnectionTarget,
        options: &ConnectionOptions,
    ) -> Result<RawConnection<StreamOf<F>>> {
        let Some((proxy_host, proxy_port)) = self.proxy.endpoint() else {
            let opened = open_socket(&self.sockets, target.bare_host(), target.port, options)?;
            return Ok(RawConnection::new(
                opened.stream,
                target.clone(),
                opened.remote,
                opened.local,
                false,
            ));
        };

        let mut opened = open_socket(&self.sockets, proxy_host, proxy_port, options)?;
        establish_tunnel(&mut opened.stream, target, self.proxy.auth()).map_err(|source| {
            TransportError::Tunnel {
                proxy: self.proxy.to_string(),
                target: target.clone(),
                source,
            }
        })?;
        tracing::debug!(endpoint = %target, proxy = %self.proxy, "tunnel open");

        Ok(RawConnection::new(
            opened.stream,
            target.clone(),
            opened.remote,
            opened.local,
            true,
        ))
    }

    /// Layers encryption over an already connected stream.
    ///
    /// Performs only a handshake; no new socket is opened.
    pub fn upgrade(
        &self,
        raw: RawConnection<StreamOf<F>>,
        options: &ConnectionOptions,
    ) -> Result<EncryptedConnection<StreamOf<F>>> {
        let context = self.encryption.context(&options.trust)?;
        tls::upgrade(raw, &context)
    }

    /// Runs a full attempt and returns a ready transport handle.
    ///
    /// On encrypted paths the encryption context is built first, so trust
    /// misconfiguration fails before any network activity.
    pub fn connect(
        &self,
        target: &ConnectionTarget,
        options: &ConnectionOptions,
        encrypted: bool,
    ) -> Result<Connection<StreamOf<F>>> {
        let path = ConnectPath::select(encrypted, &self.proxy);
        tracing::debug!(endpoint = %target, %path, proxy = %self.proxy, "starting connection attempt");

        let context = if path.is_encrypted() {
            Some(self.encryption.context(&options.trust)?)
        } else {
            None
        };

        let raw = self.raw_connect(target, options)?;
        let connection = match context {
            Some(context) => Connection::from(tls::upgrade(raw, &context)?),
            None => Connection::from(raw),
        };

        tracing::info!(
            endpoint = %target,
            %path,
            peer = %connection.peer_addr(),
            state = %connection.state(),
            "connection established"
        );
        Ok(connection)
    }
}

/// Connects to `target` with the default socket and encryption factories.
pub fn connect(
    target: &ConnectionTarget,
    options: &ConnectionOptions,
    encrypted: bool,
    proxy: &ProxyConfig,
) -> Result<Connection> {
    Connector::new(proxy.clone()).connect(target, options, encrypted)
}
