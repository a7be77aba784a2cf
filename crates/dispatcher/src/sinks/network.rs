//! NetworkSink - one UDP datagram per record

use contracts::{ContractError, LogRecord, Sink};
use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use tracing::{debug, instrument, warn};

/// Default datagram limit, below the 65507 byte IPv4 maximum
pub const DEFAULT_MAX_DATAGRAM: usize = 65000;

/// Wire encoding of each datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// The formatted line as UTF-8
    #[default]
    Text,
    /// The whole record as JSON
    Json,
    /// The whole record as bincode
    Bincode,
}

impl NetworkFormat {
    fn parse(value: Option<&str>) -> Result<Self, String> {
        match value {
            None | Some("text") => Ok(Self::Text),
            Some("json") => Ok(Self::Json),
            Some("bincode") => Ok(Self::Bincode),
            Some(other) => Err(format!("unknown format '{other}'")),
        }
    }
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Destination address
    pub addr: SocketAddr,
    /// Datagram encoding
    pub format: NetworkFormat,
    /// Largest datagram sent
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let raw_addr = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;
        let addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("invalid address '{raw_addr}': {e}"))?;

        let format = NetworkFormat::parse(params.get("format").map(String::as_str))?;

        let max_packet_size = match params.get("max_packet_size") {
            None => DEFAULT_MAX_DATAGRAM,
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("invalid max_packet_size '{v}'"))?,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Fire-and-forget UDP sink
///
/// Send errors are logged and counted, never returned: a lost datagram must
/// not surface as a worker failure. Encoding errors and oversized structured
/// payloads are returned.
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: UdpSocket,
    buf: Vec<u8>,
    send_failures: u64,
}

impl NetworkSink {
    /// Bind an ephemeral local port and connect it to `config.addr`
    #[instrument(name = "network_sink_new", skip(name, config), fields(addr = %config.addr))]
    pub fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let local: SocketAddr = if config.addr.is_ipv6() {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv4Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(config.addr)?;

        debug!(sink = %name, local = ?socket.local_addr().ok(), "NetworkSink connected");

        Ok(Self {
            name,
            buf: Vec::with_capacity(config.max_packet_size.min(4096)),
            config,
            socket,
            send_failures: 0,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_connection(&name, e))?;
        Self::new(name.clone(), config)
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))
    }

    /// Datagrams the OS refused to send
    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }

    /// Encode `record` into the reusable buffer
    fn encode(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        self.buf.clear();
        match self.config.format {
            NetworkFormat::Text => {
                let line = if record.formatted.is_empty() {
                    &record.raw
                } else {
                    &record.formatted
                };
                let cut = floor_char_boundary(line, self.config.max_packet_size);
                if cut < line.len() {
                    warn!(
                        sink = %self.name,
                        size = line.len(),
                        max = self.config.max_packet_size,
                        "Line too long, truncating"
                    );
                }
                self.buf.extend_from_slice(&line.as_bytes()[..cut]);
                return Ok(());
            }
            NetworkFormat::Json => serde_json::to_writer(&mut self.buf, record)
                .map_err(|e| ContractError::sink_write(&self.name, format!("json error: {e}")))?,
            NetworkFormat::Bincode => bincode::serialize_into(&mut self.buf, record)
                .map_err(|e| ContractError::sink_write(&self.name, format!("bincode error: {e}")))?,
        }

        // A cut structured payload cannot be decoded, so refuse it
        if self.buf.len() > self.config.max_packet_size {
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "encoded record is {} bytes, limit {}",
                    self.buf.len(),
                    self.config.max_packet_size
                ),
            ));
        }
        Ok(())
    }
}

/// Largest index `<= max` that splits `s` on a char boundary
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

impl Sink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        self.encode(record)?;
        if let Err(e) = self.socket.send(&self.buf) {
            self.send_failures += 1;
            warn!(
                sink = %self.name,
                error = %e,
                failures = self.send_failures,
                "UDP send failed"
            );
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        // Datagrams are sent immediately
        Ok(())
    }
}
