//! Socket tuning and trust setters

use std::path::PathBuf;
use std::time::Duration;

use rpcsock_client::{ConfigSource, ConnectionOptions, PerformancePreferences, TlsProtocol};

use crate::builder::core::TransportBuilder;

impl TransportBuilder {
    /// Replace all options with those derived from a configuration source
    ///
    /// Keys are looked up as `rpc.<name>` first, then as `<name>`.
    ///
    /// # Examples
    /// ```no_run
    /// let conn = rpcsock::Transport::to("rpc.example.com", 1666)
    ///     .config(&[("rpc.so-timeout", "5000"), ("use-keepalive", "no")])
    ///     .connect();
    /// ```
    #[must_use]
    pub fn config<C: ConfigSource + ?Sized>(mut self, source: &C) -> Self {
        self.options = ConnectionOptions::from_config(source);
        self
    }

    /// Replace all options with a prepared set
    #[must_use]
    pub fn with_options(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn tcp_no_delay(mut self, enabled: bool) -> Self {
        self.options.tcp_no_delay = enabled;
        self
    }

    #[must_use]
    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.options.keep_alive = enabled;
        self
    }

    /// Set the socket read timeout
    ///
    /// A zero duration disables the timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.options.so_timeout = timeout;
        self
    }

    #[must_use]
    pub fn read_timeout_millis(self, millis: u64) -> Self {
        self.read_timeout(Duration::from_millis(millis))
    }

    /// Set connection-time, latency and bandwidth priorities
    #[must_use]
    pub fn performance_preferences(mut self, connection_time: i32, latency: i32, bandwidth: i32) -> Self {
        self.options.perf_prefs = Some(PerformancePreferences::new(connection_time, latency, bandwidth));
        self
    }

    #[must_use]
    pub fn no_performance_preferences(mut self) -> Self {
        self.options.perf_prefs = None;
        self
    }

    /// Set `SO_RCVBUF`; zero keeps the platform default
    #[must_use]
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.options.recv_buf_size = size;
        self
    }

    /// Set `SO_SNDBUF`; zero keeps the platform default
    #[must_use]
    pub fn send_buffer_size(mut self, size: usize) -> Self {
        self.options.send_buf_size = size;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = Some(timeout);
        self
    }

    /// Trust the PEM certificates in `path` in addition to any system roots
    #[must_use]
    pub fn trust_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.trust.ca_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn system_roots(mut self, enabled: bool) -> Self {
        self.options.trust.use_system_roots = enabled;
        self
    }

    /// Restrict the TLS versions that may be negotiated
    #[must_use]
    pub fn protocols(mut self, protocols: &[TlsProtocol]) -> Self {
        self.options.trust.protocols = protocols.to_vec();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transport;

    #[test]
    fn test_setters_update_options() {
        let builder = Transport::to("rpc.local", 1666)
            .tcp_no_delay(false)
            .keep_alive(false)
            .read_timeout_millis(250)
            .performance_preferences(0, 1, 2)
            .recv_buffer_size(8192)
            .send_buffer_size(4096)
            .connect_timeout(Duration::from_secs(2))
            .protocols(&[TlsProtocol::Tls13]);

        let options = builder.options();
        assert!(!options.tcp_no_delay);
        assert!(!options.keep_alive);
        assert_eq!(options.so_timeout, Duration::from_millis(250));
        assert_eq!(options.perf_prefs.map(|p| p.as_array()), Some([0, 1, 2]));
        assert_eq!(options.recv_buf_size, 8192);
        assert_eq!(options.send_buf_size, 4096);
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(options.trust.protocols, vec![TlsProtocol::Tls13]);
    }

    #[test]
    fn test_config_source_replaces_options() {
        let builder = Transport::to("rpc.local", 1666)
            .recv_buffer_size(1)
            .config(&[("rpc.so-timeout", "0"), ("use-keepalive", "nah")]);

        let options = builder.options();
        assert_eq!(options.read_timeout(), None);
        assert!(!options.keep_alive);
        assert_eq!(options.recv_buf_size, 0);
    }

    #[test]
    fn test_with_options_replaces_then_setters_refine() {
        let prepared = ConnectionOptions::default()
            .with_recv_buf_size(16_384)
            .with_keep_alive(false);

        let builder = Transport::to("rpc.local", 1666)
            .tcp_no_delay(false)
            .with_options(prepared)
            .send_buffer_size(2048);

        let options = builder.options();
        assert!(options.tcp_no_delay);
        assert!(!options.keep_alive);
        assert_eq!(options.recv_buf_size, 16_384);
        assert_eq!(options.send_buf_size, 2048);
    }
}
