//! Socket option application
//!
//! Applies TCP tuning to a socket before it is bound and connected. Every
//! option is best-effort: a failure is logged, recorded as an
//! [`AdvisoryError`] in the returned [`ApplyReport`] and otherwise ignored,
//! leaving the platform default for that option in place.

use std::io;
use std::time::Duration;

use super::socket::TransportSocket;
use crate::config::{ConnectionOptions, PerformancePreferences};
use crate::error::{AdvisoryError, SocketOption};

/// Decides keepalive from the `use-keepalive` token.
///
/// Only a value starting with `n` or `N` disables keepalive; anything else,
/// including an empty or missing value, leaves it enabled.
pub fn keepalive_enabled(token: Option<&str>) -> bool {
    !matches!(token, Some(t) if t.starts_with(['n', 'N']))
}

/// An option value that was successfully applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedOption {
    TcpNoDelay(bool),
    PerformancePreferences(PerformancePreferences),
    ReadTimeout(Option<Duration>),
    KeepAlive(bool),
    RecvBufferSize(usize),
    SendBufferSize(usize),
}

impl AppliedOption {
    pub fn option(&self) -> SocketOption {
        match self {
            AppliedOption::TcpNoDelay(_) => SocketOption::TcpNoDelay,
            AppliedOption::PerformancePreferences(_) => SocketOption::PerformancePreferences,
            AppliedOption::ReadTimeout(_) => SocketOption::ReadTimeout,
            AppliedOption::KeepAlive(_) => SocketOption::KeepAlive,
            AppliedOption::RecvBufferSize(_) => SocketOption::RecvBufferSize,
            AppliedOption::SendBufferSize(_) => SocketOption::SendBufferSize,
        }
    }
}

/// Outcome of applying options to one socket.
#[derive(Debug, Default)]
pub struct ApplyReport {
    applied: Vec<AppliedOption>,
    advisories: Vec<AdvisoryError>,
}

impl ApplyReport {
    pub fn applied(&self) -> &[AppliedOption] {
        &self.applied
    }

    pub fn advisories(&self) -> &[AdvisoryError] {
        &self.advisories
    }

    /// True when every attempted option was applied.
    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }

    /// True when nothing was attempted at all.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.advisories.is_empty()
    }

    pub fn get(&self, option: SocketOption) -> Option<&AppliedOption> {
        self.applied.iter().find(|applied| applied.option() == option)
    }

    pub fn performance_preferences(&self) -> Option<PerformancePreferences> {
        self.applied.iter().find_map(|applied| match applied {
            AppliedOption::PerformancePreferences(prefs) => Some(*prefs),
            _ => None,
        })
    }

    pub fn recv_buffer_size(&self) -> Option<usize> {
        self.applied.iter().find_map(|applied| match applied {
            AppliedOption::RecvBufferSize(size) => Some(*size),
            _ => None,
        })
    }

    pub fn send_buffer_size(&self) -> Option<usize> {
        self.applied.iter().find_map(|applied| match applied {
            AppliedOption::SendBufferSize(size) => Some(*size),
            _ => None,
        })
    }

    fn record(&mut self, value: AppliedOption, result: io::Result<()>) {
        match result {
            Ok(()) => {
                tracing::trace!(option = %value.option(), ?value, "socket option applied");
                self.applied.push(value);
            }
            Err(source) => {
                let advisory = AdvisoryError::new(value.option(), source);
                tracing::warn!(
                    option = %advisory.option,
                    error = %advisory.source,
                    "unexpected failure while setting RPC socket option; keeping platform default"
                );
                self.advisories.push(advisory);
            }
        }
    }
}

/// Applies `options` to `socket`.
///
/// Does nothing when either is absent. Never fails; see [`ApplyReport`] for
/// what was applied.
pub fn apply<S: TransportSocket>(
    socket: Option<&S>,
    options: Option<&ConnectionOptions>,
) -> ApplyReport {
    match (socket, options) {
        (Some(socket), Some(options)) => configure_socket(socket, options),
        _ => ApplyReport::default(),
    }
}

/// Applies every configured option to `socket`, independently of the others.
pub fn configure_socket<S: TransportSocket>(
    socket: &S,
    options: &ConnectionOptions,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    report.record(
        AppliedOption::TcpNoDelay(options.tcp_no_delay),
        socket.set_tcp_nodelay(options.tcp_no_delay),
    );

    if let Some(prefs) = options.perf_prefs {
        report.record(
            AppliedOption::PerformancePreferences(prefs),
            socket.set_performance_preferences(prefs),
        );
    }

    let timeout = options.read_timeout();
    report.record(
        AppliedOption::ReadTimeout(timeout),
        socket.set_read_timeout(timeout),
    );

    report.record(
        AppliedOption::KeepAlive(options.keep_alive),
        socket.set_keepalive(options.keep_alive),
    );

    if options.recv_buf_size != 0 {
        report.record(
            AppliedOption::RecvBufferSize(options.recv_buf_size),
            socket.set_recv_buffer_size(options.recv_buf_size),
        );
    }

    if options.send_buf_size != 0 {
        report.record(
            AppliedOption::SendBufferSize(options.send_buf_size),
            socket.set_send_buffer_size(options.send_buf_size),
        );
    }

    report
}
