//! Proxy configuration values

use std::fmt;

use base64::Engine;

/// Basic credentials presented to the proxy on CONNECT.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    username: String,
    password: String,
}

impl ProxyAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value of the `Proxy-Authorization` header.
    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for ProxyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP proxy used to tunnel connections.
///
/// The default value has no host and therefore means "connect directly".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    host: Option<String>,
    port: u16,
    auth: Option<ProxyAuth>,
}

impl ProxyConfig {
    /// Direct connections, no proxy.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// An HTTP proxy at `host:port`.
    ///
    /// A bracketed IPv6 literal such as `[::1]` is stored without brackets.
    pub fn http(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let host = match host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            Some(bare) => bare.to_string(),
            None => host,
        };
        Self {
            host: Some(host),
            port,
            auth: None,
        }
    }

    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(ProxyAuth::new(username, password));
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn auth(&self) -> Option<&ProxyAuth> {
        self.auth.as_ref()
    }

    /// `host:port` of the proxy, when one is configured.
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        self.host.as_deref().map(|host| (host, self.port))
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) if host.contains(':') => {
                write!(f, "[{host}]:{}", self.port)
            }
            Some(host) => write!(f, "{host}:{}", self.port),
            None => f.write_str("direct"),
        }
    }
}
