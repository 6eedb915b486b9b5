//! Host name resolution
//!
//! IP literals skip the resolver entirely.

use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

/// Resolves `host:port` and returns the first address.
pub fn resolve_first(host: &str, port: u16) -> io::Result<SocketAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses resolved for {host}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_literals_take_the_fast_path() {
        assert_eq!(
            resolve_first("10.1.2.3", 80).expect("ipv4"),
            SocketAddr::from(([10, 1, 2, 3], 80))
        );
        assert!(resolve_first("::1", 443).expect("ipv6").is_ipv6());
    }
}
