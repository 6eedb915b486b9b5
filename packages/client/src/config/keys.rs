//! Configuration key nicknames and their defaults

use std::time::Duration;

/// Prefix of the fully qualified key form.
pub const PREFIX: &str = "rpc.";

/// Delimiter between elements of list-valued keys.
pub const LIST_DELIMITER: char = ',';

pub const TCP_NO_DELAY: &str = "tcp-no-delay";
pub const TCP_NO_DELAY_DEFAULT: bool = true;

pub const USE_KEEPALIVE: &str = "use-keepalive";

pub const SO_TIMEOUT: &str = "so-timeout";
pub const SO_TIMEOUT_DEFAULT_MILLIS: u64 = 30_000;

pub const PERFORMANCE_PREFERENCES: &str = "performance-preferences";
/// Connection time, latency, bandwidth: latency first.
pub const PERFORMANCE_PREFERENCES_DEFAULT: [i32; 3] = [1, 2, 0];

pub const RECV_BUF_SIZE: &str = "recv-buf-size";
pub const SEND_BUF_SIZE: &str = "send-buf-size";

pub const CONNECT_TIMEOUT: &str = "connect-timeout";

pub const TRUST_CA_FILE: &str = "trust-ca-file";
pub const TRUST_SYSTEM_ROOTS: &str = "trust-system-roots";
pub const TRUST_SYSTEM_ROOTS_DEFAULT: bool = true;

pub const SECURE_PROTOCOLS: &str = "secure-protocols";

/// Fully qualified form of a nickname.
pub fn qualified(nick: &str) -> String {
    format!("{PREFIX}{nick}")
}

pub fn so_timeout_default() -> Duration {
    Duration::from_millis(SO_TIMEOUT_DEFAULT_MILLIS)
}
