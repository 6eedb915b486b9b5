//! Loopback servers and an instrumented socket factory for integration tests

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rpcsock_client::{
    ConnectionOptions, EncryptionContext, PerformancePreferences, SocketFactory, SocketOption,
    SystemSocket, TransportSocket,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{RootCertStore, ServerConfig, ServerConnection, StreamOwned};

/// What a [`RecordingSockets`] factory observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketEvent {
    Create(SocketAddr),
    Option(SocketOption),
    Bind(SocketAddr),
    Connect(SocketAddr),
}

/// Socket factory that records every call and can inject failures.
#[derive(Debug, Clone, Default)]
pub struct RecordingSockets {
    events: Arc<Mutex<Vec<SocketEvent>>>,
    failing_options: Vec<SocketOption>,
    fail_bind: bool,
    fail_connect: bool,
}

impl RecordingSockets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_option(mut self, option: SocketOption) -> Self {
        self.failing_options.push(option);
        self
    }

    pub fn failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn events(&self) -> Vec<SocketEvent> {
        self.events.lock().expect("events lock").clone()
    }

    pub fn binds(&self) -> Vec<SocketAddr> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SocketEvent::Bind(addr) => Some(addr),
                _ => None,
            })
            .collect()
    }

    pub fn connects(&self) -> Vec<SocketAddr> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SocketEvent::Connect(addr) => Some(addr),
                _ => None,
            })
            .collect()
    }

    pub fn network_events(&self) -> Vec<SocketEvent> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, SocketEvent::Option(_)))
            .collect()
    }
}

pub struct RecordingSocket {
    inner: SystemSocket,
    events: Arc<Mutex<Vec<SocketEvent>>>,
    failing_options: Vec<SocketOption>,
    fail_bind: bool,
    fail_connect: bool,
}

impl RecordingSocket {
    fn record(&self, event: SocketEvent) {
        self.events.lock().expect("events lock").push(event);
    }

    fn option(&self, option: SocketOption, set: impl FnOnce() -> io::Result<()>) -> io::Result<()> {
        self.record(SocketEvent::Option(option));
        if self.failing_options.contains(&option) {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "injected option failure"));
        }
        set()
    }
}

impl TransportSocket for RecordingSocket {
    type Stream = TcpStream;

    fn set_tcp_nodelay(&self, enabled: bool) -> io::Result<()> {
        self.option(SocketOption::TcpNoDelay, || self.inner.set_tcp_nodelay(enabled))
    }

    fn set_keepalive(&self, enabled: bool) -> io::Result<()> {
        self.option(SocketOption::KeepAlive, || self.inner.set_keepalive(enabled))
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.option(SocketOption::ReadTimeout, || self.inner.set_read_timeout(timeout))
    }

    fn set_performance_preferences(&self, prefs: PerformancePreferences) -> io::Result<()> {
        self.option(SocketOption::PerformancePreferences, || {
            self.inner.set_performance_preferences(prefs)
        })
    }

    fn set_recv_buffer_size(&self, size: usize) -> io::Result<()> {
        self.option(SocketOption::RecvBufferSize, || self.inner.set_recv_buffer_size(size))
    }

    fn set_send_buffer_size(&self, size: usize) -> io::Result<()> {
        self.option(SocketOption::SendBufferSize, || self.inner.set_send_buffer_size(size))
    }

    fn bind(&self, local: SocketAddr) -> io::Result<()> {
        self.record(SocketEvent::Bind(local));
        if self.fail_bind {
            return Err(io::Error::new(io::ErrorKind::AddrInUse, "injected bind failure"));
        }
        self.inner.bind(local)
    }

    fn connect(&self, remote: SocketAddr, timeout: Option<Duration>) -> io::Result<()> {
        self.record(SocketEvent::Connect(remote));
        if self.fail_connect {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "injected connect failure"));
        }
        self.inner.connect(remote, timeout)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    fn into_stream(self) -> TcpStream {
        self.inner.into_stream()
    }
}

impl SocketFactory for RecordingSockets {
    type Socket = RecordingSocket;

    fn create(&self, remote: SocketAddr) -> io::Result<RecordingSocket> {
        self.events
            .lock()
            .expect("events lock")
            .push(SocketEvent::Create(remote));
        Ok(RecordingSocket {
            inner: SystemSocket::for_remote(remote)?,
            events: Arc::clone(&self.events),
            failing_options: self.failing_options.clone(),
            fail_bind: self.fail_bind,
            fail_connect: self.fail_connect,
        })
    }
}

/// Options that keep a broken test from hanging.
pub fn test_options() -> ConnectionOptions {
    ConnectionOptions::default()
        .with_so_timeout(Duration::from_secs(5))
        .with_connect_timeout(Some(Duration::from_secs(5)))
}

/// A loopback server counting accepted connections.
pub struct TestServer {
    pub addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

fn serve<H>(handler: H) -> TestServer
where
    H: Fn(TcpStream) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    let handler = Arc::new(handler);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);
            let handler = Arc::clone(&handler);
            thread::spawn(move || handler(stream));
        }
    });

    TestServer { addr, accepted }
}

fn echo<S: Read + Write>(mut stream: S) {
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if stream.write_all(&buf[..n]).and_then(|()| stream.flush()).is_err() {
                    break;
                }
            }
        }
    }
}

/// Plain TCP echo server.
pub fn echo_server() -> TestServer {
    serve(echo::<TcpStream>)
}

/// Self-signed certificate for `127.0.0.1` and the matching key.
pub struct TestCertificate {
    pub cert: CertificateDer<'static>,
    pub key: Vec<u8>,
}

impl TestCertificate {
    pub fn generate() -> Self {
        let key_pair = rcgen::KeyPair::generate().expect("key pair");
        let cert = rcgen::CertificateParams::new(vec!["127.0.0.1".to_string()])
            .expect("certificate params")
            .self_signed(&key_pair)
            .expect("self-signed certificate");
        Self {
            cert: cert.der().clone(),
            key: key_pair.serialize_der(),
        }
    }

    /// Client context trusting only this certificate.
    pub fn client_context(&self) -> EncryptionContext {
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.clone()).expect("add test root");
        EncryptionContext::with_roots(roots, &[]).expect("client context")
    }

    fn server_config(&self) -> Arc<ServerConfig> {
        let config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(
            vec![self.cert.clone()],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.clone())),
        )
        .expect("server certificate");
        Arc::new(config)
    }
}

/// TLS echo server presenting `certificate`.
pub fn tls_echo_server(certificate: &TestCertificate) -> TestServer {
    let config = certificate.server_config();
    serve(move |stream| {
        let Ok(session) = ServerConnection::new(Arc::clone(&config)) else {
            return;
        };
        echo(StreamOwned::new(session, stream));
    })
}

/// CONNECT requests a [`TestProxy`] received.
pub type ConnectLog = Arc<Mutex<Vec<String>>>;

pub struct TestProxy {
    pub server: TestServer,
    pub requests: ConnectLog,
}

impl TestProxy {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

/// HTTP CONNECT proxy that tunnels to the requested authority.
pub fn connect_proxy() -> TestProxy {
    proxy_with(None)
}

/// Proxy answering every CONNECT with `status_line`.
pub fn rejecting_proxy(status_line: &'static str) -> TestProxy {
    proxy_with(Some(status_line))
}

fn proxy_with(reject: Option<&'static str>) -> TestProxy {
    let requests: ConnectLog = Arc::default();
    let log = Arc::clone(&requests);

    let server = serve(move |mut client| {
        let Some(head) = read_head(&mut client) else {
            return;
        };
        let request_line = head.lines().next().unwrap_or_default().to_string();
        log.lock().expect("requests lock").push(head.clone());

        if let Some(status) = reject {
            let _ = client.write_all(format!("{status}\r\n\r\n").as_bytes());
            return;
        }

        let Some(authority) = request_line
            .strip_prefix("CONNECT ")
            .and_then(|rest| rest.split(' ').next())
        else {
            let _ = client.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n");
            return;
        };

        let Ok(upstream) = TcpStream::connect(authority) else {
            let _ = client.write_all(b"HTTP/1.1 502 Bad Gateway\r\n\r\n");
            return;
        };
        if client
            .write_all(b"HTTP/1.1 200 Connection established\r\n\r\n")
            .is_err()
        {
            return;
        }
        pipe(client, upstream);
    });

    TestProxy { server, requests }
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => return None,
        }
    }
    String::from_utf8(head).ok()
}

fn pipe(client: TcpStream, upstream: TcpStream) {
    let (Ok(mut client_read), Ok(mut upstream_write)) = (client.try_clone(), upstream.try_clone())
    else {
        return;
    };
    let forward = thread::spawn(move || {
        let _ = io::copy(&mut client_read, &mut upstream_write);
        let _ = upstream_write.shutdown(Shutdown::Write);
    });

    let (mut upstream_read, mut client_write) = (upstream, client);
    let _ = io::copy(&mut upstream_read, &mut client_write);
    let _ = client_write.shutdown(Shutdown::Write);
    let _ = forward.join();
}

/// Writes `payload` and reads back the same number of bytes.
pub fn round_trip<S: Read + Write>(stream: &mut S, payload: &[u8]) -> Vec<u8> {
    stream.write_all(payload).expect("write payload");
    stream.flush().expect("flush payload");
    let mut echoed = vec![0u8; payload.len()];
    stream.read_exact(&mut echoed).expect("read echo");
    echoed
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    listener.local_addr().expect("probe addr").port()
}
