//! Connection endpoints, path selection and attempt states

use std::fmt;

use crate::proxy::ProxyConfig;

/// Remote endpoint of a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
}

impl ConnectionTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host without IPv6 brackets, as used for name resolution and TLS.
    #[must_use]
    pub fn bare_host(&self) -> &str {
        self.host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.host)
    }

    /// `host:port` with IPv6 literals bracketed.
    #[must_use]
    pub fn authority(&self) -> String {
        let host = self.bare_host();
        if host.contains(':') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

impl From<(&str, u16)> for ConnectionTarget {
    fn from((host, port): (&str, u16)) -> Self {
        Self::new(host, port)
    }
}

impl From<(String, u16)> for ConnectionTarget {
    fn from((host, port): (String, u16)) -> Self {
        Self::new(host, port)
    }
}

/// The four ways an attempt can reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectPath {
    Direct,
    Proxied,
    EncryptedDirect,
    EncryptedProxied,
}

impl ConnectPath {
    /// Chooses the path from the encryption flag and proxy presence.
    #[must_use]
    pub fn select(encrypted: bool, proxy: &ProxyConfig) -> Self {
        match (encrypted, proxy.is_enabled()) {
            (true, true) => ConnectPath::EncryptedProxied,
            (true, false) => ConnectPath::EncryptedDirect,
            (false, true) => ConnectPath::Proxied,
            (false, false) => ConnectPath::Direct,
        }
    }

    #[must_use]
    pub fn is_encrypted(self) -> bool {
        matches!(
            self,
            ConnectPath::EncryptedDirect | ConnectPath::EncryptedProxied
        )
    }

    #[must_use]
    pub fn is_proxied(self) -> bool {
        matches!(self, ConnectPath::Proxied | ConnectPath::EncryptedProxied)
    }
}

impl fmt::Display for ConnectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectPath::Direct => "direct",
            ConnectPath::Proxied => "proxied",
            ConnectPath::EncryptedDirect => "encrypted-direct",
            ConnectPath::EncryptedProxied => "encrypted-proxied",
        })
    }
}

/// Progress of a single connection attempt.
///
/// `Created → Configured → Bound → Connected → Upgraded`, where the last
/// step only happens for encrypted attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttemptState {
    Created,
    Configured,
    Bound,
    Connected,
    Upgraded,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttemptState::Created => "created",
            AttemptState::Configured => "configured",
            AttemptState::Bound => "bound",
            AttemptState::Connected => "connected",
            AttemptState::Upgraded => "upgraded",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_brackets_ipv6() {
        assert_eq!(ConnectionTarget::new("::1", 1666).authority(), "[::1]:1666");
        assert_eq!(ConnectionTarget::new("[::1]", 1666).authority(), "[::1]:1666");
        assert_eq!(ConnectionTarget::new("[::1]", 1666).bare_host(), "::1");
        assert_eq!(
            ConnectionTarget::new("perforce", 1666).to_string(),
            "perforce:1666"
        );
    }

    #[test]
    fn path_selection_matrix() {
        let none = ProxyConfig::none();
        let proxy = ProxyConfig::http("proxy.local", 3128);
        assert_eq!(ConnectPath::select(false, &none), ConnectPath::Direct);
        assert_eq!(ConnectPath::select(false, &proxy), ConnectPath::Proxied);
        assert_eq!(ConnectPath::select(true, &none), ConnectPath::EncryptedDirect);
        assert_eq!(ConnectPath::select(true, &proxy), ConnectPath::EncryptedProxied);
        assert!(ConnectPath::EncryptedProxied.is_encrypted());
        assert!(ConnectPath::EncryptedProxied.is_proxied());
        assert!(!ConnectPath::EncryptedDirect.is_proxied());
    }
}
