//! ServerName: the domain-level node of the tree
//!
//! Two server names may carry the same domain under different listens; they
//! are still distinct nodes, each owning its own locations.

use super::location::Location;
use crate::directive::Directive;
use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

/// A domain and the locations served under it
#[derive(Debug, Clone, PartialEq)]
pub struct ServerName {
    domain: String,
    locations: BTreeMap<String, Location>,
}

impl ServerName {
    pub fn new(domain: &str) -> Result<Self> {
        if domain.is_empty() {
            return Err(Error::MissingField { field: "domain" });
        }
        Ok(Self::unchecked(domain))
    }

    /// For domains that already passed signature validation
    pub(crate) fn unchecked(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            locations: BTreeMap::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The domain is bound for life; any attempt to change it fails
    pub fn set_domain(&mut self, domain: &str) -> Result<()> {
        Err(Error::ImmutabilityViolation {
            field: "domain",
            current: self.domain.clone(),
            attempted: domain.to_string(),
        })
    }

    pub fn location(&self, path: &str) -> Option<&Location> {
        self.locations.get(path)
    }

    /// Locations in path order
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Add a location unless one with the same path is already held.
    ///
    /// Returns `false` when the path was taken; the held location is kept.
    pub fn insert_location(&mut self, location: Location) -> bool {
        if self.locations.contains_key(location.path()) {
            return false;
        }
        self.locations.insert(location.path().to_string(), location);
        true
    }

    /// Route a directive to its location, creating the location on first sight
    pub(crate) fn absorb(&mut self, directive: &Directive) {
        let path = directive.signature().location();
        if !self.locations.contains_key(path) {
            tracing::debug!("📍 New location {}{}", self.domain, path);
        }
        self.locations
            .entry(path.to_string())
            .or_insert_with(|| Location::unchecked(path))
            .absorb(directive);
    }

    /// Valid iff every location is valid
    pub fn is_valid(&self) -> bool {
        self.locations.values().all(Location::is_valid)
    }
}

impl Serialize for ServerName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ServerName", 3)?;
        state.serialize_field("domain", &self.domain)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("locations", &self.locations)?;
        state.end()
    }
}
