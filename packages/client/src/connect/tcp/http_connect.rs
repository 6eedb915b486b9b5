//! HTTP CONNECT tunnel establishment
//!
//! Asks an HTTP proxy to open a tunnel to the target and consumes the
//! proxy's response headers. Nothing past the blank line ending the headers
//! is read, so the stream is positioned at the first tunneled byte.

use std::io::{Read, Write};

use crate::connect::types::ConnectionTarget;
use crate::proxy::{ProxyAuth, TunnelError};

/// Upper bound on the size of the proxy's response head.
pub const MAX_RESPONSE_HEAD: usize = 8 * 1024;

/// Establish an HTTP CONNECT tunnel to `target` over `proxy_stream`.
///
/// The target host is sent as given, unresolved, so the proxy performs name
/// resolution.
pub fn establish_tunnel<S: Read + Write>(
    proxy_stream: &mut S,
    target: &ConnectionTarget,
    auth: Option<&ProxyAuth>,
) -> Result<(), TunnelError> {
    let authority = target.authority();
    let mut request = format!("CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\n");
    if let Some(auth) = auth {
        request.push_str("Proxy-Authorization: ");
        request.push_str(&auth.header_value());
        request.push_str("\r\n");
    }
    request.push_str("\r\n");

    proxy_stream.write_all(request.as_bytes())?;
    proxy_stream.flush()?;

    let head = read_response_head(proxy_stream)?;
    let status_line = head.lines().next().unwrap_or_default();
    let (status, reason) = parse_status_line(status_line)?;

    if !(200..300).contains(&status) {
        return Err(TunnelError::Rejected {
            status,
            reason: reason.to_string(),
        });
    }

    tracing::trace!(endpoint = %target, status, "CONNECT tunnel established");
    Ok(())
}

/// Reads up to and including the `\r\n\r\n` ending the response head.
///
/// Reads one byte at a time so no tunneled bytes are consumed.
fn read_response_head<S: Read>(stream: &mut S) -> Result<String, TunnelError> {
    let mut head = Vec::with_capacity(256);
    let mut byte = [0u8; 1];

    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_RESPONSE_HEAD {
            return Err(TunnelError::HeadersTooLarge {
                limit: MAX_RESPONSE_HEAD,
            });
        }
        match stream.read(&mut byte)? {
            0 if head.is_empty() => return Err(TunnelError::Closed),
            0 => {
                return Err(TunnelError::Malformed(
                    String::from_utf8_lossy(&head).into_owned(),
                ));
            }
            _ => head.push(byte[0]),
        }
    }

    String::from_utf8(head).map_err(|e| TunnelError::Malformed(format!("non UTF-8 head: {e}")))
}

fn parse_status_line(line: &str) -> Result<(u16, &str), TunnelError> {
    let malformed = || TunnelError::Malformed(line.to_string());

    let mut parts = line.splitn(3, ' ');
    let version = parts.next().ok_or_else(malformed)?;
    if !version.starts_with("HTTP/1.") {
        return Err(malformed());
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(malformed)?;
    let reason = parts.next().unwrap_or_default().trim();
    Ok((status, reason))
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;

    /// Replays a canned proxy response and captures what was written.
    struct MockProxy {
        response: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl MockProxy {
        fn replying(response: &[u8]) -> Self {
            Self {
                response: Cursor::new(response.to_vec()),
                written: Vec::new(),
            }
        }

        fn request(&self) -> String {
            String::from_utf8_lossy(&self.written).into_owned()
        }

        fn remaining(&mut self) -> Vec<u8> {
            let mut rest = Vec::new();
            self.response.read_to_end(&mut rest).expect("read rest");
            rest
        }
    }

    impl Read for MockProxy {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.response.read(buf)
        }
    }

    impl Write for MockProxy {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sends_connect_and_stops_after_headers() {
        let mut proxy = MockProxy::replying(
            b"HTTP/1.1 200 Connection established\r\nVia: test\r\n\r\n\x16\x03\x01",
        );
        let target = ConnectionTarget::new("rpc.internal", 8443);

        establish_tunnel(&mut proxy, &target, None).expect("tunnel");

        assert_eq!(
            proxy.request(),
            "CONNECT rpc.internal:8443 HTTP/1.1\r\nHost: rpc.internal:8443\r\n\r\n"
        );
        assert_eq!(proxy.remaining(), b"\x16\x03\x01");
    }

    #[test]
    fn includes_basic_credentials() {
        let mut proxy = MockProxy::replying(b"HTTP/1.0 200 OK\r\n\r\n");
        let auth = ProxyAuth::new("user", "pass");

        establish_tunnel(&mut proxy, &ConnectionTarget::new("::1", 9000), Some(&auth))
            .expect("tunnel");

        let request = proxy.request();
        assert!(request.starts_with("CONNECT [::1]:9000 HTTP/1.1\r\n"));
        assert!(request.contains("Proxy-Authorization: Basic dXNlcjpwYXNz\r\n"));
    }

    #[test]
    fn non_success_status_is_rejected() {
        let mut proxy =
            MockProxy::replying(b"HTTP/1.1 407 Proxy Authentication Required\r\n\r\n");
        let err = establish_tunnel(&mut proxy, &ConnectionTarget::new("h", 1), None)
            .expect_err("407 must fail");
        assert!(matches!(
            err,
            TunnelError::Rejected { status: 407, ref reason } if reason == "Proxy Authentication Required"
        ));
    }

    #[test]
    fn early_close_and_garbage() {
        let mut closed = MockProxy::replying(b"");
        assert!(matches!(
            establish_tunnel(&mut closed, &ConnectionTarget::new("h", 1), None),
            Err(TunnelError::Closed)
        ));

        let mut truncated = MockProxy::replying(b"HTTP/1.1 200 OK\r\n");
        assert!(matches!(
            establish_tunnel(&mut truncated, &ConnectionTarget::new("h", 1), None),
            Err(TunnelError::Malformed(_))
        ));

        let mut garbage = MockProxy::replying(b"SSH-2.0-OpenSSH\r\n\r\n");
        assert!(matches!(
            establish_tunnel(&mut garbage, &ConnectionTarget::new("h", 1), None),
            Err(TunnelError::Malformed(_))
        ));
    }

    #[test]
    fn oversized_head_is_refused() {
        let mut response = b"HTTP/1.1 200 OK\r\n".to_vec();
        response.extend(std::iter::repeat_n(b'x', MAX_RESPONSE_HEAD));
        let mut proxy = MockProxy::replying(&response);
        assert!(matches!(
            establish_tunnel(&mut proxy, &ConnectionTarget::new("h", 1), None),
            Err(TunnelError::HeadersTooLarge { .. })
        ));
    }
}
