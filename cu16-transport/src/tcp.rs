//! TCP transport 

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;
use cu16_core::constants::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS, MAX_RESPONSE_SIZE};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// TCP transport for CU16 control units (or a TCP bridge/simulator in front of them)
///
/// Every call opens a fresh connection, writes one frame, performs a single
/// bounded read and closes the socket. The socket never outlives the call.
///
/// Only the first chunk the OS delivers is returned. A reply split across TCP
/// segments is not reassembled, and several queued replies come back together.
pub struct TcpTransport {
    host: String,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
    in_flight: Mutex<()>,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            in_flight: Mutex::new(()),
        }
    }
    
    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
    
    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
    
    /// Connection timeout in use
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
    
    /// Read timeout in use
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
    
    /// Resolve host and port to the first SocketAddr
    fn resolve_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))
    }
    
    fn connect(&self, addr: SocketAddr) -> Result<TcpStream> {
        debug!("Connecting to {}...", addr);
        
        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout).map_err(|e| {
            warn!("Connect to {} failed: {}", addr, e);
            connect_error(e)
        })?;
        
        // Disable Nagle's algorithm, frames are tiny
        stream.set_nodelay(true).map_err(Error::ConnectFailed)?;
        stream
            .set_read_timeout(Some(self.read_timeout))
            .map_err(Error::ConnectFailed)?;
        
        Ok(stream)
    }
    
    fn exchange(&self, stream: &mut TcpStream, frame: &[u8]) -> Result<Bytes> {
        trace!("Sending {} bytes: {}", frame.len(), hex::encode_upper(frame));
        
        stream.write_all(frame)?;
        stream.flush()?;
        
        let mut buf = [0u8; MAX_RESPONSE_SIZE];
        let n = stream.read(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                warn!("Read timeout after {:?}", self.read_timeout);
                Error::ReadTimeout
            }
            _ => Error::Io(e),
        })?;
        
        if n == 0 {
            warn!("Received 0 bytes");
            return Err(Error::NoResponse);
        }
        
        trace!("Received {} bytes: {}", n, hex::encode_upper(&buf[..n]));
        
        Ok(Bytes::copy_from_slice(&buf[..n]))
    }
}

/// Classify an error raised while the connection was being set up
fn connect_error(e: io::Error) -> Error {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => Error::ConnectTimeout,
        ErrorKind::ConnectionRefused => Error::ConnectRefused(e),
        _ => Error::ConnectFailed(e),
    }
}

impl Transport for TcpTransport {
    fn send_and_receive(&self, frame: &[u8]) -> Result<Bytes> {
        let _exclusive = self.in_flight.lock();
        
        let addr = self.resolve_addr()?;
        let mut stream = self.connect(addr)?;
        
        let result = self.exchange(&mut stream, frame);
        
        // Peer must see EOF before the lock is released
        if let Err(e) = stream.shutdown(Shutdown::Both) {
            if e.kind() != ErrorKind::NotConnected {
                debug!("Shutdown of {} failed: {}", addr, e);
            }
        }
        
        if let Ok(reply) = &result {
            debug!("Exchange with {} returned {} bytes", addr, reply.len());
        }
        
        result
    }
    
    fn remote_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    
    fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }
    
    #[test]
    fn test_tcp_transport_defaults() {
        let transport = TcpTransport::new("192.168.1.50", 4001);
        assert_eq!(transport.connect_timeout(), Duration::from_millis(3000));
        assert_eq!(transport.read_timeout(), Duration::from_millis(3000));
        assert_eq!(transport.remote_addr(), "192.168.1.50:4001");
    }
    
    #[test]
    fn test_tcp_transport_echo() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = conn.read(&mut buf).unwrap();
            conn.write_all(&buf[..n]).unwrap();
        });
        
        let transport = TcpTransport::new("127.0.0.1", port);
        let reply = transport.send_and_receive(&[0x02, 0x01, 0x30, 0x03, 0x36]).unwrap();
        
        assert_eq!(reply.as_ref(), &[0x02, 0x01, 0x30, 0x03, 0x36]);
        server.join().unwrap();
    }
    
    #[test]
    fn test_tcp_transport_connect_refused() {
        let (listener, port) = listener();
        drop(listener);
        
        let transport = TcpTransport::new("127.0.0.1", port)
            .with_connect_timeout(Duration::from_millis(500));
        
        let err = transport.send_and_receive(&[0x02]).unwrap_err();
        assert!(err.is_connect_failure(), "unexpected error: {err}");
    }
    
    #[test]
    fn test_tcp_transport_zero_connect_timeout() {
        let (_listener, port) = listener();
        
        let transport = TcpTransport::new("127.0.0.1", port)
            .with_connect_timeout(Duration::ZERO);
        
        let err = transport.send_and_receive(&[0x02]).unwrap_err();
        assert!(matches!(err, Error::ConnectFailed(_)), "unexpected error: {err}");
        assert!(err.is_connect_failure());
    }
    
    #[test]
    fn test_connect_error_classification() {
        assert!(matches!(
            connect_error(io::Error::from(ErrorKind::TimedOut)),
            Error::ConnectTimeout
        ));
        assert!(matches!(
            connect_error(io::Error::from(ErrorKind::ConnectionRefused)),
            Error::ConnectRefused(_)
        ));
        
        let unreachable = connect_error(io::Error::from(ErrorKind::AddrNotAvailable));
        assert!(matches!(unreachable, Error::ConnectFailed(_)));
        assert!(unreachable.is_connect_failure());
        assert!(!unreachable.is_silent());
    }
    
    #[test]
    fn test_tcp_transport_invalid_address() {
        let transport = TcpTransport::new("invalid..address", 4001)
            .with_connect_timeout(Duration::from_millis(100));
        
        let result = transport.send_and_receive(&[0x02]);
        assert!(matches!(result, Err(Error::InvalidAddress(_))));
    }
    
    #[test]
    fn test_tcp_transport_closed_without_reply() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let _ = conn.read(&mut buf).unwrap();
        });
        
        let transport = TcpTransport::new("127.0.0.1", port);
        let result = transport.send_and_receive(&[0x02, 0x01, 0x30, 0x03, 0x36]);
        
        assert!(matches!(result, Err(Error::NoResponse)));
        server.join().unwrap();
    }
    
    #[test]
    fn test_tcp_transport_read_timeout() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (conn, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(300));
            drop(conn);
        });
        
        let transport = TcpTransport::new("127.0.0.1", port)
            .with_read_timeout(Duration::from_millis(50));
        let result = transport.send_and_receive(&[0x02, 0x01, 0x30, 0x03, 0x36]);
        
        assert!(matches!(result, Err(Error::ReadTimeout)));
        server.join().unwrap();
    }
    
    #[test]
    fn test_tcp_transport_exchanges_never_overlap() {
        let (listener, port) = listener();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        
        let server = {
            let active = active.clone();
            let peak = peak.clone();
            thread::spawn(move || {
                let mut handlers = Vec::new();
                for _ in 0..4 {
                    let (mut conn, _) = listener.accept().unwrap();
                    let active = active.clone();
                    let peak = peak.clone();
                    handlers.push(thread::spawn(move || {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        
                        let mut buf = [0u8; 16];
                        let n = conn.read(&mut buf).unwrap();
                        thread::sleep(Duration::from_millis(30));
                        
                        active.fetch_sub(1, Ordering::SeqCst);
                        conn.write_all(&buf[..n]).unwrap();
                    }));
                }
                for handler in handlers {
                    handler.join().unwrap();
                }
            })
        };
        
        let transport = Arc::new(TcpTransport::new("127.0.0.1", port));
        let clients: Vec<_> = (0..4u8)
            .map(|i| {
                let transport = transport.clone();
                thread::spawn(move || transport.send_and_receive(&[i]).unwrap())
            })
            .collect();
        
        for client in clients {
            assert_eq!(client.join().unwrap().len(), 1);
        }
        server.join().unwrap();
        
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
