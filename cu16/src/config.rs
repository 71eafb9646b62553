//! Service configuration

use std::time::Duration;

use cu16_core::MAX_UNITS;
use cu16_core::constants::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS};
use cu16_transport::TcpTransport;

use crate::error::{Error, Result};

/// Default TCP port of the serial bridge in front of the bus
pub const DEFAULT_PORT: u16 = 4001;

/// Where a [`Cu16Service`](crate::Cu16Service) sends its frames
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cu16::ServiceConfig;
///
/// let config = ServiceConfig::new("10.0.0.20", 4001)
///     .with_cu_id(2)
///     .with_read_timeout(Duration::from_millis(500));
///
/// assert_eq!(config.cu_id, 2);
/// assert_eq!(config.connect_timeout, Duration::from_millis(3000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    
    /// Control unit this service addresses (low nibble used)
    pub cu_id: u8,
    
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

impl ServiceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            cu_id: 0,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
        }
    }
    
    /// Set control unit id
    pub fn with_cu_id(mut self, cu_id: u8) -> Self {
        self.cu_id = cu_id;
        self
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
    
    /// Read `CU16_HOST`, `CU16_PORT`, `CU16_CU_ID`, `CU16_CONNECT_TIMEOUT_MS`
    /// and `CU16_READ_TIMEOUT_MS`, falling back to defaults for unset ones
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
    
    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        
        if let Some(host) = lookup("CU16_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "CU16_PORT")? {
            config.port = port;
        }
        let cu_id: Option<u8> = parse_var(&lookup, "CU16_CU_ID")?;
        if let Some(cu_id) = cu_id {
            if usize::from(cu_id) >= MAX_UNITS {
                return Err(Error::Config(format!("CU16_CU_ID out of range: {}", cu_id)));
            }
            config.cu_id = cu_id;
        }
        if let Some(timeout) = parse_timeout(&lookup, "CU16_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout = timeout;
        }
        if let Some(timeout) = parse_timeout(&lookup, "CU16_READ_TIMEOUT_MS")? {
            config.read_timeout = timeout;
        }
        
        Ok(config)
    }
    
    /// Build the TCP transport this configuration describes
    pub fn transport(&self) -> TcpTransport {
        TcpTransport::new(self.host.clone(), self.port)
            .with_connect_timeout(self.connect_timeout)
            .with_read_timeout(self.read_timeout)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}: {}", key, e)))
        })
        .transpose()
}

/// Millisecond timeout; zero is rejected since std sockets refuse a zero timeout
fn parse_timeout(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    match parse_var::<u64>(lookup, key)? {
        Some(0) => Err(Error::Config(format!("{} must be greater than zero", key))),
        ms => Ok(ms.map(Duration::from_millis)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cu16_transport::Transport;
    use pretty_assertions::assert_eq;
    
    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.cu_id, 0);
        assert_eq!(config.read_timeout, Duration::from_millis(3000));
    }
    
    #[test]
    fn test_from_lookup() {
        let config = ServiceConfig::from_lookup(|key| match key {
            "CU16_HOST" => Some("locker.local".to_string()),
            "CU16_PORT" => Some("5000".to_string()),
            "CU16_CU_ID" => Some("3".to_string()),
            "CU16_READ_TIMEOUT_MS" => Some(" 750 ".to_string()),
            _ => None,
        })
        .unwrap();
        
        assert_eq!(config.host, "locker.local");
        assert_eq!(config.port, 5000);
        assert_eq!(config.cu_id, 3);
        assert_eq!(config.connect_timeout, Duration::from_millis(3000));
        assert_eq!(config.read_timeout, Duration::from_millis(750));
    }
    
    #[test]
    fn test_from_lookup_rejects_garbage() {
        let bad_port = ServiceConfig::from_lookup(|key| {
            (key == "CU16_PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(bad_port, Err(Error::Config(_))));
        
        let bad_cu = ServiceConfig::from_lookup(|key| {
            (key == "CU16_CU_ID").then(|| "16".to_string())
        });
        assert!(matches!(bad_cu, Err(Error::Config(_))));
    }
    
    #[test]
    fn test_from_lookup_rejects_zero_timeouts() {
        let zero_connect = ServiceConfig::from_lookup(|key| {
            (key == "CU16_CONNECT_TIMEOUT_MS").then(|| "0".to_string())
        });
        assert!(matches!(zero_connect, Err(Error::Config(_))));
        
        let zero_read = ServiceConfig::from_lookup(|key| {
            (key == "CU16_READ_TIMEOUT_MS").then(|| " 0 ".to_string())
        });
        assert!(matches!(zero_read, Err(Error::Config(_))));
    }
    
    #[test]
    fn test_transport_carries_timeouts() {
        let transport = ServiceConfig::new("10.1.1.1", 4002)
            .with_connect_timeout(Duration::from_millis(100))
            .transport();
        
        assert_eq!(transport.remote_addr(), "10.1.1.1:4002");
        assert_eq!(transport.connect_timeout(), Duration::from_millis(100));
    }
}
