//! Listen address (`ip:port`) parsing and validation

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;

/// IP used when a directive does not name one
pub const DEFAULT_IP: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Port used when a directive does not name one
pub const DEFAULT_PORT: u16 = 80;

/// A validated IPv4 address and port pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    ip: Ipv4Addr,
    port: u16,
}

impl Address {
    /// Build an address from an already typed port
    pub fn new(ip: &str, port: u16) -> Result<Self> {
        let ip = parse_ipv4("ip", ip)?;
        if port == 0 {
            return Err(Error::format("port", "0", "must be between 1 and 65535"));
        }
        Ok(Self { ip, port })
    }

    /// Build an address from its textual parts, as found in a signature
    pub fn parse(ip: &str, port: &str) -> Result<Self> {
        let ip = parse_ipv4("ip", ip)?;
        let port = parse_port("port", port)?;
        Ok(Self { ip, port })
    }

    /// Build an address from loosely typed values; absent or null parts
    /// fall back to `0.0.0.0` and `80`
    pub fn from_values(ip: Option<&serde_json::Value>, port: Option<&serde_json::Value>) -> Result<Self> {
        let ip = match ip {
            None | Some(serde_json::Value::Null) => DEFAULT_IP,
            Some(serde_json::Value::String(ip)) => parse_ipv4("ip", ip)?,
            Some(other) => return Err(Error::mismatch("ip", "string", other)),
        };
        let port = match port {
            None | Some(serde_json::Value::Null) => DEFAULT_PORT,
            Some(port) => port_from_value("port", port)?,
        };
        Ok(Self { ip, port })
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Address {
    fn default() -> Self {
        Self {
            ip: DEFAULT_IP,
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a strict dotted-quad IPv4 address
pub(crate) fn parse_ipv4(field: &'static str, value: &str) -> Result<Ipv4Addr> {
    if value.is_empty() {
        return Err(Error::MissingField { field });
    }
    value
        .parse::<Ipv4Addr>()
        .map_err(|_| Error::format(field, value, "not a valid IPv4 address"))
}

/// Parse a decimal port in `[1, 65535]`
pub(crate) fn parse_port(field: &'static str, value: &str) -> Result<u16> {
    if value.is_empty() {
        return Err(Error::MissingField { field });
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::format(field, value, "must be a decimal number"));
    }
    match value.parse::<u64>() {
        Ok(port @ 1..=65535) => u16::try_from(port)
            .map_err(|_| Error::format(field, value, "must be between 1 and 65535")),
        _ => Err(Error::format(field, value, "must be between 1 and 65535")),
    }
}

/// Parse a port given either as a string or as an integer
pub(crate) fn port_from_value(field: &'static str, value: &serde_json::Value) -> Result<u16> {
    match value {
        serde_json::Value::String(s) => parse_port(field, s),
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(port) => parse_port(field, &port.to_string()),
            None => Err(Error::format(field, n.to_string(), "must be between 1 and 65535")),
        },
        other => Err(Error::mismatch(field, "string or integer", other)),
    }
}
