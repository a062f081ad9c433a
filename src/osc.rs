//! Minimal OSC encoder and UDP sender.
//!
//! Only the subset needed to drive a fixture is supported: one address
//! pattern, the `,f` type tag and a single big-endian `float32` argument.
//!
//! ```
//! use dmx_head_tracker::osc::encode;
//!
//! let packet = encode("/dmx/pan", 0.5);
//! assert_eq!(packet.len() % 4, 0);
//! assert_eq!(&packet[..12], b"/dmx/pan\0\0\0\0");
//! ```

use crate::{Error, Result};
use log::debug;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};

/// Type tag for a single float argument
pub const FLOAT_TYPE_TAG: &str = ",f";

/// A single-float OSC message
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    /// Address pattern, e.g. `/dmx/pan`
    pub address: String,
    /// Float argument
    pub value: f32,
}

impl OscMessage {
    /// Create a message for `address` carrying `value`
    #[must_use]
    pub fn new(address: impl Into<String>, value: f32) -> Self {
        Self {
            address: address.into(),
            value,
        }
    }

    /// Serialize to the OSC wire format
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.address, self.value)
    }
}

/// Append `s` NUL-terminated and zero-padded to a multiple of four bytes
fn write_padded_str(buffer: &mut Vec<u8>, s: &str) {
    buffer.extend_from_slice(s.as_bytes());
    buffer.push(0);
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

/// Encode a single-float OSC message
#[must_use]
pub fn encode(address: &str, value: f32) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(address.len() + 12);
    write_padded_str(&mut buffer, address);
    write_padded_str(&mut buffer, FLOAT_TYPE_TAG);
    buffer.extend_from_slice(&value.to_be_bytes());
    buffer
}

/// Decode a message produced by [`encode`]
///
/// # Errors
///
/// Returns an error if the packet is truncated, not padded, or carries a
/// type tag other than `,f`.
pub fn decode(packet: &[u8]) -> Result<OscMessage> {
    let (address, rest) = read_padded_str(packet)?;
    let (tag, rest) = read_padded_str(rest)?;
    if tag != FLOAT_TYPE_TAG {
        return Err(Error::InvalidInput(format!("unsupported OSC type tag {tag:?}")));
    }
    let bytes: [u8; 4] = rest
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("expected 4 argument bytes, got {}", rest.len())))?;
    Ok(OscMessage::new(address, f32::from_be_bytes(bytes)))
}

fn read_padded_str(packet: &[u8]) -> Result<(&str, &[u8])> {
    let end = packet
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::InvalidInput("unterminated OSC string".to_string()))?;
    let padded = (end + 4) & !3;
    if padded > packet.len() {
        return Err(Error::InvalidInput("truncated OSC string padding".to_string()));
    }
    let s = std::str::from_utf8(&packet[..end])
        .map_err(|e| Error::InvalidInput(format!("OSC string is not UTF-8: {e}")))?;
    Ok((s, &packet[padded..]))
}

/// UDP transport for OSC messages
///
/// A single unbound socket is created lazily and reused across sends. The
/// receiver address is resolved once per `(host, port)` and cached.
#[derive(Debug, Default)]
pub struct OscSender {
    socket: Option<UdpSocket>,
    target: Option<ResolvedTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedTarget {
    host: String,
    port: u16,
    addr: SocketAddr,
}

impl OscSender {
    /// Create a sender; the socket is opened on first use
    #[must_use]
    pub const fn new() -> Self {
        Self {
            socket: None,
            target: None,
        }
    }

    fn target(&mut self, host: &str, port: u16) -> Result<SocketAddr> {
        if let Some(target) = &self.target {
            if target.port == port && target.host == host {
                return Ok(target.addr);
            }
        }
        let addr = resolve(host, port)?;
        self.target = Some(ResolvedTarget {
            host: host.to_string(),
            port,
            addr,
        });
        Ok(addr)
    }

    fn socket(&mut self) -> Result<&UdpSocket> {
        if self.socket.is_none() {
            let socket = UdpSocket::bind(("0.0.0.0", 0))
                .map_err(|e| Error::Transport(format!("failed to create OSC socket: {e}")))?;
            self.socket = Some(socket);
        }
        self.socket
            .as_ref()
            .ok_or_else(|| Error::Transport("OSC socket unavailable".to_string()))
    }

    /// Send one message to `host:port` as a single datagram
    ///
    /// # Errors
    ///
    /// Returns a transport error if the host does not resolve or the
    /// datagram cannot be sent.
    pub fn send(&mut self, host: &str, port: u16, message: &OscMessage) -> Result<()> {
        let target = self.target(host, port)?;
        let packet = message.to_bytes();
        let socket = self.socket()?;
        let sent = socket.send_to(&packet, target).map_err(|e| {
            Error::Transport(format!("failed to send OSC message to {host}:{port}: {e}"))
        });
        if sent.is_err() {
            // socket and address are recreated on the next send
            self.socket = None;
            self.target = None;
        }
        sent?;
        debug!("OSC {} = {:.4} -> {}", message.address, message.value, target);
        Ok(())
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(SocketAddr::from((ip, port)));
    }
    (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::Transport(format!("invalid OSC host address {host}: {e}")))?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| Error::Transport(format!("no IPv4 address for OSC host {host}")))
}
