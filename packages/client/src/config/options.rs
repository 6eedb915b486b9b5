//! Per-attempt connection options
//!
//! [`ConnectionOptions`] is derived once from a [`ConfigSource`] and then
//! treated as read-only; the `with_*` methods produce modified copies.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::ConfigSource;
use super::keys;
use crate::connect::tcp::socket_config::keepalive_enabled;

/// Relative importance of short connection time, low latency and high
/// bandwidth. Always exactly three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PerformancePreferences {
    pub connection_time: i32,
    pub latency: i32,
    pub bandwidth: i32,
}

impl PerformancePreferences {
    #[must_use]
    pub const fn new(connection_time: i32, latency: i32, bandwidth: i32) -> Self {
        Self {
            connection_time,
            latency,
            bandwidth,
        }
    }

    /// Builds preferences from a slice, only if it holds exactly three values.
    #[must_use]
    pub fn from_slice(values: &[i32]) -> Option<Self> {
        match *values {
            [connection_time, latency, bandwidth] => {
                Some(Self::new(connection_time, latency, bandwidth))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> [i32; 3] {
        [self.connection_time, self.latency, self.bandwidth]
    }

    /// Parses a delimited triple such as `1,2,0`.
    ///
    /// Returns `None` for anything other than exactly three integers.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let values = value
            .split(keys::LIST_DELIMITER)
            .map(|v| v.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        Self::from_slice(&values)
    }
}

impl Default for PerformancePreferences {
    fn default() -> Self {
        let [c, l, b] = keys::PERFORMANCE_PREFERENCES_DEFAULT;
        Self::new(c, l, b)
    }
}

/// TLS protocol versions an encrypted transport may negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlsProtocol {
    Tls12,
    Tls13,
}

impl TlsProtocol {
    pub const ALL: [TlsProtocol; 2] = [TlsProtocol::Tls12, TlsProtocol::Tls13];

    pub fn version(self) -> &'static rustls::SupportedProtocolVersion {
        match self {
            TlsProtocol::Tls12 => &rustls::version::TLS12,
            TlsProtocol::Tls13 => &rustls::version::TLS13,
        }
    }

    /// Parses a delimited protocol list, skipping unknown names.
    ///
    /// Falls back to [`TlsProtocol::ALL`] when nothing usable remains.
    pub fn parse_list(value: &str) -> Vec<TlsProtocol> {
        let mut protocols = Vec::new();
        for token in value.split(keys::LIST_DELIMITER).map(str::trim) {
            if token.is_empty() {
                continue;
            }
            match token.parse::<TlsProtocol>() {
                Ok(protocol) if !protocols.contains(&protocol) => protocols.push(protocol),
                Ok(_) => {}
                Err(()) => tracing::warn!(protocol = token, "ignoring unsupported TLS protocol"),
            }
        }
        if protocols.is_empty() {
            protocols.extend(Self::ALL);
        }
        protocols
    }
}

impl FromStr for TlsProtocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.trim_start_matches("tlsv").trim_start_matches("tls") {
            "1.2" | "12" => Ok(TlsProtocol::Tls12),
            "1.3" | "13" => Ok(TlsProtocol::Tls13),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TlsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsProtocol::Tls12 => f.write_str("TLSv1.2"),
            TlsProtocol::Tls13 => f.write_str("TLSv1.3"),
        }
    }
}

/// Trust material used to build an encryption context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustSettings {
    /// Extra root certificates in PEM form.
    pub ca_file: Option<PathBuf>,
    /// Include the platform's root store.
    pub use_system_roots: bool,
    pub protocols: Vec<TlsProtocol>,
}

impl Default for TrustSettings {
    fn default() -> Self {
        Self {
            ca_file: None,
            use_system_roots: keys::TRUST_SYSTEM_ROOTS_DEFAULT,
            protocols: TlsProtocol::ALL.to_vec(),
        }
    }
}

impl TrustSettings {
    pub fn from_config<C: ConfigSource + ?Sized>(config: &C) -> Self {
        Self {
            ca_file: config
                .property(keys::TRUST_CA_FILE)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            use_system_roots: bool_property(
                config,
                keys::TRUST_SYSTEM_ROOTS,
                keys::TRUST_SYSTEM_ROOTS_DEFAULT,
            ),
            protocols: config
                .property(keys::SECURE_PROTOCOLS)
                .map(|v| TlsProtocol::parse_list(&v))
                .unwrap_or_else(|| TlsProtocol::ALL.to_vec()),
        }
    }
}

/// Socket tuning and trust settings for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub tcp_no_delay: bool,
    pub keep_alive: bool,
    /// Read timeout; zero means block indefinitely.
    pub so_timeout: Duration,
    pub perf_prefs: Option<PerformancePreferences>,
    /// Receive buffer size in bytes; zero leaves the OS default.
    pub recv_buf_size: usize,
    /// Send buffer size in bytes; zero leaves the OS default.
    pub send_buf_size: usize,
    pub connect_timeout: Option<Duration>,
    pub trust: TrustSettings,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            tcp_no_delay: keys::TCP_NO_DELAY_DEFAULT,
            keep_alive: true,
            so_timeout: keys::so_timeout_default(),
            perf_prefs: Some(PerformancePreferences::default()),
            recv_buf_size: 0,
            send_buf_size: 0,
            connect_timeout: None,
            trust: TrustSettings::default(),
        }
    }
}

impl ConnectionOptions {
    /// Derives options from a configuration source.
    ///
    /// Missing keys take their defaults. Unparsable numbers fall back to the
    /// default with a warning. A malformed performance-preference value
    /// yields no preferences at all.
    pub fn from_config<C: ConfigSource + ?Sized>(config: &C) -> Self {
        let perf_prefs = match config.property(keys::PERFORMANCE_PREFERENCES) {
            None => Some(PerformancePreferences::default()),
            Some(raw) => {
                let parsed = PerformancePreferences::parse(&raw);
                if parsed.is_none() {
                    tracing::warn!(
                        key = keys::PERFORMANCE_PREFERENCES,
                        value = %raw,
                        "performance preferences need exactly three integers; none will be applied"
                    );
                }
                parsed
            }
        };

        let connect_timeout_ms = int_property(config, keys::CONNECT_TIMEOUT, 0u64);

        Self {
            tcp_no_delay: bool_property(config, keys::TCP_NO_DELAY, keys::TCP_NO_DELAY_DEFAULT),
            keep_alive: keepalive_enabled(config.property(keys::USE_KEEPALIVE).as_deref()),
            so_timeout: Duration::from_millis(int_property(
                config,
                keys::SO_TIMEOUT,
                keys::SO_TIMEOUT_DEFAULT_MILLIS,
            )),
            perf_prefs,
            recv_buf_size: int_property(config, keys::RECV_BUF_SIZE, 0usize),
            send_buf_size: int_property(config, keys::SEND_BUF_SIZE, 0usize),
            connect_timeout: (connect_timeout_ms != 0)
                .then(|| Duration::from_millis(connect_timeout_ms)),
            trust: TrustSettings::from_config(config),
        }
    }

    /// Read timeout as the socket layer expects it.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        (!self.so_timeout.is_zero()).then_some(self.so_timeout)
    }

    #[must_use]
    pub fn with_tcp_no_delay(mut self, enabled: bool) -> Self {
        self.tcp_no_delay = enabled;
        self
    }

    #[must_use]
    pub fn with_keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    #[must_use]
    pub fn with_so_timeout(mut self, timeout: Duration) -> Self {
        self.so_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_performance_preferences(mut self, prefs: Option<PerformancePreferences>) -> Self {
        self.perf_prefs = prefs;
        self
    }

    #[must_use]
    pub fn with_recv_buf_size(mut self, size: usize) -> Self {
        self.recv_buf_size = size;
        self
    }

    #[must_use]
    pub fn with_send_buf_size(mut self, size: usize) -> Self {
        self.send_buf_size = size;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_trust(mut self, trust: TrustSettings) -> Self {
        self.trust = trust;
        self
    }
}

// Only a case-insensitive "true" enables a present flag.
fn bool_property<C: ConfigSource + ?Sized>(config: &C, nick: &str, default: bool) -> bool {
    config
        .property(nick)
        .map_or(default, |v| v.trim().eq_ignore_ascii_case("true"))
}

fn int_property<C, T>(config: &C, nick: &str, default: T) -> T
where
    C: ConfigSource + ?Sized,
    T: FromStr + fmt::Display + Copy,
{
    let Some(raw) = config.property(nick) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key = nick, value = %raw, %default, "ignoring unparsable configuration value");
            default
        }
    }
}
