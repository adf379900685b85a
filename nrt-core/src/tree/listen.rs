//! Listen: the address-level node of the tree

use super::server_name::ServerName;
use crate::address::Address;
use crate::directive::Directive;
use crate::error::Result;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// An `ip:port` pair and the server names reachable through it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listen {
    address: Address,
    server_names: BTreeMap<String, ServerName>,
}

impl Listen {
    /// Validate `ip` and `port` and create an empty listen
    pub fn new(ip: &str, port: &str) -> Result<Self> {
        Ok(Self::with_address(Address::parse(ip, port)?))
    }

    /// Same as [`new`](Self::new) for loosely typed input; absent parts
    /// take the `0.0.0.0:80` defaults
    pub fn from_values(ip: Option<&Value>, port: Option<&Value>) -> Result<Self> {
        Ok(Self::with_address(Address::from_values(ip, port)?))
    }

    pub fn with_address(address: Address) -> Self {
        Self {
            address,
            server_names: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn server_name(&self, domain: &str) -> Option<&ServerName> {
        self.server_names.get(domain)
    }

    /// Server names in domain order
    pub fn server_names(&self) -> impl Iterator<Item = &ServerName> {
        self.server_names.values()
    }

    pub fn len(&self) -> usize {
        self.server_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.server_names.is_empty()
    }

    /// Add a server name unless its domain is already held.
    ///
    /// Returns `false` when the domain was taken; the held node is kept.
    pub fn insert_server_name(&mut self, server_name: ServerName) -> bool {
        if self.server_names.contains_key(server_name.domain()) {
            return false;
        }
        self.server_names.insert(server_name.domain().to_string(), server_name);
        true
    }

    /// Route a directive to its server name, creating it on first sight
    pub(crate) fn absorb(&mut self, directive: &Directive) {
        let domain = directive.signature().server_name();
        if !self.server_names.contains_key(domain) {
            tracing::debug!("🌐 New server name {} on {}", domain, self.address);
        }
        self.server_names
            .entry(domain.to_string())
            .or_insert_with(|| ServerName::unchecked(domain))
            .absorb(directive);
    }

    /// Valid iff every server name is valid
    pub fn is_valid(&self) -> bool {
        self.server_names.values().all(ServerName::is_valid)
    }
}

impl Serialize for Listen {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Listen", 3)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("server_names", &self.server_names)?;
        state.end()
    }
}
