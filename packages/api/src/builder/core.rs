//! Core `TransportBuilder` structure and connect entry points

use std::fmt;

use rpcsock_client::{
    Connection, ConnectionOptions, ConnectionTarget, Connector, EncryptionContext, ProxyConfig,
    StaticContextFactory, TransportError,
};

/// Errors returned by [`TransportBuilder::connect_async`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("connection task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Fluent description of a single connection attempt
#[derive(Clone)]
pub struct TransportBuilder {
    pub(crate) target: ConnectionTarget,
    pub(crate) options: ConnectionOptions,
    pub(crate) proxy: ProxyConfig,
    pub(crate) encrypted: bool,
    pub(crate) context: Option<EncryptionContext>,
    pub(crate) debug_enabled: bool,
}

impl TransportBuilder {
    /// Create a builder for a plain, direct connection with default tuning
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            target: ConnectionTarget::new(host, port),
            options: ConnectionOptions::default(),
            proxy: ProxyConfig::none(),
            encrypted: false,
            context: None,
            debug_enabled: false,
        }
    }

    /// Request a TLS upgrade once the byte stream is connected
    #[must_use]
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Connect without encryption (the default)
    #[must_use]
    pub fn plain(mut self) -> Self {
        self.encrypted = false;
        self
    }

    /// Enable debug logging for this attempt
    ///
    /// Logs the resolved options and proxy before connecting.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Use a prepared encryption context instead of building one from the
    /// trust settings
    ///
    /// # Examples
    /// ```no_run
    /// use rpcsock::{EncryptionContextFactory, RustlsContextFactory, TrustSettings};
    ///
    /// let context = RustlsContextFactory.context(&TrustSettings::default())?;
    /// let conn = rpcsock::Transport::secure("rpc.example.com", 1667)
    ///     .encryption_context(context)
    ///     .connect()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn encryption_context(mut self, context: EncryptionContext) -> Self {
        self.context = Some(context);
        self.encrypted = true;
        self
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Establish the connection, blocking the calling thread
    ///
    /// # Returns
    /// A ready [`Connection`], or the first fatal [`TransportError`]
    ///
    /// # Examples
    /// ```no_run
    /// use std::io::Write;
    ///
    /// let mut conn = rpcsock::Transport::to("rpc.example.com", 1666)
    ///     .read_timeout_millis(5_000)
    ///     .connect()?;
    /// conn.write_all(b"hello")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn connect(self) -> Result<Connection, TransportError> {
        if self.debug_enabled {
            tracing::debug!(
                endpoint = %self.target,
                encrypted = self.encrypted,
                proxy = %self.proxy,
                options = ?self.options,
                "connecting"
            );
        }

        let connector = Connector::new(self.proxy);
        match self.context {
            Some(context) => connector
                .with_encryption(StaticContextFactory::new(context))
                .connect(&self.target, &self.options, self.encrypted),
            None => connector.connect(&self.target, &self.options, self.encrypted),
        }
    }

    /// Establish the connection on the runtime's blocking thread pool
    ///
    /// # Errors
    /// [`ConnectError::Transport`] for connection failures,
    /// [`ConnectError::Join`] if the blocking task panicked or was cancelled
    pub async fn connect_async(self) -> Result<Connection, ConnectError> {
        let connection = tokio::task::spawn_blocking(move || self.connect()).await??;
        Ok(connection)
    }
}

impl fmt::Debug for TransportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportBuilder")
            .field("target", &self.target)
            .field("encrypted", &self.encrypted)
            .field("proxy", &self.proxy)
            .field("options", &self.options)
            .field("custom_context", &self.context.is_some())
            .field("debug_enabled", &self.debug_enabled)
            .finish()
    }
}
