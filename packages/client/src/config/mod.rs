//! Connection configuration
//!
//! Options are derived once per attempt from a [`ConfigSource`], a narrow
//! key/value lookup implemented for the usual map types and for the process
//! environment. Keys are looked up first in their fully qualified form
//! (`rpc.<nick>`) and then by bare nickname.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

pub mod keys;
pub mod options;

pub use options::{ConnectionOptions, PerformancePreferences, TlsProtocol, TrustSettings};

/// Key/value configuration lookup.
pub trait ConfigSource {
    /// Returns the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Looks up a nickname, preferring the `rpc.`-prefixed form.
    fn property(&self, nick: &str) -> Option<String> {
        self.get(&keys::qualified(nick)).or_else(|| self.get(nick))
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<S: BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl ConfigSource for [(&str, &str)] {
    fn get(&self, key: &str) -> Option<String> {
        self.iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
    }
}

impl<const N: usize> ConfigSource for [(&str, &str); N] {
    fn get(&self, key: &str) -> Option<String> {
        ConfigSource::get(self.as_slice(), key)
    }
}

/// Configuration read from environment variables.
///
/// `tcp-no-delay` maps to `RPC_TCP_NO_DELAY`, `rpc.tcp-no-delay` to the same
/// variable, so both lookup forms agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl EnvConfig {
    fn variable(key: &str) -> String {
        let bare = key.strip_prefix(keys::PREFIX).unwrap_or(key);
        let mut name = String::with_capacity(bare.len() + 4);
        name.push_str("RPC_");
        for c in bare.chars() {
            match c {
                '-' | '.' => name.push('_'),
                c => name.push(c.to_ascii_uppercase()),
            }
        }
        name
    }
}

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::variable(key)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_key_wins_over_nickname() {
        let mut map = HashMap::new();
        map.insert("so-timeout".to_string(), "100".to_string());
        map.insert("rpc.so-timeout".to_string(), "200".to_string());
        assert_eq!(map.property("so-timeout").as_deref(), Some("200"));

        map.remove("rpc.so-timeout");
        assert_eq!(map.property("so-timeout").as_deref(), Some("100"));
    }

    #[test]
    fn slice_source_prefers_last_entry() {
        let pairs = [("recv-buf-size", "1024"), ("recv-buf-size", "2048")];
        assert_eq!(pairs.property("recv-buf-size").as_deref(), Some("2048"));
        assert_eq!(pairs.property("send-buf-size"), None);
    }

    #[test]
    fn env_variable_names() {
        assert_eq!(EnvConfig::variable("tcp-no-delay"), "RPC_TCP_NO_DELAY");
        assert_eq!(EnvConfig::variable("rpc.use-keepalive"), "RPC_USE_KEEPALIVE");
    }
}
