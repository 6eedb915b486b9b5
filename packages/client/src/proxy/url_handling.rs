//! Proxy URL parsing and environment lookup

use std::env;

use url::Url;

use super::errors::ProxyError;
use super::types::ProxyConfig;

/// Environment variables consulted by [`ProxyConfig::from_env`], in order.
pub const PROXY_ENV_VARS: [&str; 4] = ["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"];

impl ProxyConfig {
    /// Parses `http://[user:pass@]host[:port]`.
    ///
    /// A missing scheme is read as `http`; a missing port as 80.
    pub fn parse(value: &str) -> Result<Self, ProxyError> {
        let value = value.trim();
        let parsed = if value.contains("://") {
            Url::parse(value)
        } else {
            Url::parse(&format!("http://{value}"))
        };
        let url = parsed.map_err(|source| ProxyError::InvalidUrl {
            url: value.to_string(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(ProxyError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProxyError::MissingHost(value.to_string()))?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let port = url.port_or_known_default().unwrap_or(80);

        let mut proxy = ProxyConfig::http(host, port);
        if !url.username().is_empty() {
            let username = urlencoding::decode(url.username())
                .map_err(|_| ProxyError::InvalidCredentials)?;
            let password = urlencoding::decode(url.password().unwrap_or(""))
                .map_err(|_| ProxyError::InvalidCredentials)?;
            proxy = proxy.with_basic_auth(username.into_owned(), password.into_owned());
        }
        Ok(proxy)
    }

    /// Reads the proxy from the conventional environment variables.
    ///
    /// Unset or empty variables mean no proxy. An unparsable value is
    /// skipped with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        for name in PROXY_ENV_VARS {
            let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            match Self::parse(&value) {
                Ok(proxy) => {
                    tracing::debug!(variable = name, proxy = %proxy, "using proxy from environment");
                    return proxy;
                }
                Err(err) => {
                    tracing::warn!(variable = name, error = %err, "ignoring unusable proxy setting");
                }
            }
        }
        Self::none()
    }
}
