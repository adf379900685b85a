//! ResolutionTree: the root of the tree
//!
//! The tree owns the accepted directives and one [`Listen`] per address.
//! Accepting a directive walks it straight down to its location; there is no
//! separate rebuild step, so the tree is always current.
//!
//! Duplicate signatures are first-write-wins: the first directive accepted
//! for a signature is kept and later ones are ignored, parameters included.

use super::listen::Listen;
use crate::address::Address;
use crate::directive::{Directive, Signature};
use crate::error::{Error, Result};
use crate::export::{LocationKey, LocationView, Renderer};
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Root of the Listen → ServerName → Location hierarchy
#[derive(Debug, Clone, Default)]
pub struct ResolutionTree {
    directives: Vec<Directive>,
    signatures: HashSet<Signature>,
    listens: BTreeMap<Address, Listen>,
}

impl ResolutionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a whole batch, stopping at the first bad directive
    pub fn from_directives<I>(directives: I) -> Result<Self>
    where
        I: IntoIterator<Item = Directive>,
    {
        let mut tree = Self::new();
        tree.extend(directives)?;
        Ok(tree)
    }

    /// Accept a directive and walk it down to its location.
    ///
    /// Returns `false` if a directive with the same signature was already
    /// accepted, in which case nothing changes.
    pub fn add_directive(&mut self, directive: Directive) -> Result<bool> {
        let signature = directive.signature();
        if self.signatures.contains(signature) {
            let held = self.directives.iter().find(|d| d.signature() == signature);
            if held.is_some_and(|held| held.parameters() != directive.parameters()) {
                tracing::warn!(
                    "Ignoring parameters of duplicate directive {}; the first one wins",
                    signature
                );
            } else {
                tracing::trace!("Duplicate directive {}", signature);
            }
            return Ok(false);
        }

        let address = signature.address();
        let listen = self.listens.entry(address).or_insert_with(|| {
            tracing::debug!("🔌 New listen {}", address);
            Listen::with_address(address)
        });
        listen.absorb(&directive);

        tracing::debug!("✅ Accepted directive {}", signature);
        self.signatures.insert(signature.clone());
        self.directives.push(directive);
        Ok(true)
    }

    /// Decode a raw directive record and accept it
    pub fn add_value(&mut self, value: &Value) -> Result<bool> {
        self.add_directive(Directive::from_value(value)?)
    }

    /// Accept every directive in order; returns how many were new
    pub fn extend<I>(&mut self, directives: I) -> Result<usize>
    where
        I: IntoIterator<Item = Directive>,
    {
        let mut accepted = 0;
        for directive in directives {
            if self.add_directive(directive)? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.signatures.contains(signature)
    }

    /// Accepted directives, in acceptance order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Look a listen up by its `ip:port` text
    pub fn listen(&self, address: &str) -> Option<&Listen> {
        let (ip, port) = address.rsplit_once(':')?;
        let address = Address::parse(ip, port).ok()?;
        self.listens.get(&address)
    }

    /// Listens in address order
    pub fn listens(&self) -> impl Iterator<Item = &Listen> {
        self.listens.values()
    }

    /// Valid iff every listen is valid
    pub fn is_valid(&self) -> bool {
        self.listens.values().all(Listen::is_valid)
    }

    /// Every location that keeps the tree from being valid
    pub fn invalid_locations(&self) -> Vec<LocationKey> {
        self.locations()
            .filter(|view| !view.valid)
            .map(|view| LocationKey {
                address: view.location.address,
                domain: view.location.domain.to_string(),
                path: view.location.path.to_string(),
            })
            .collect()
    }

    /// One view per location, ordered by address, domain, then path
    pub fn locations(&self) -> impl Iterator<Item = CheckedView<'_>> {
        self.listens.values().flat_map(|listen| {
            listen.server_names().flat_map(move |server_name| {
                server_name.locations().map(move |location| CheckedView {
                    valid: location.is_valid(),
                    location: LocationView {
                        address: listen.address(),
                        domain: server_name.domain(),
                        path: location.path(),
                        aliases: location.aliases(),
                        allow: location.allow().tokens(),
                        deny: location.deny().tokens(),
                        language: location.language(),
                        language_configuration: location.language_configuration(),
                    },
                })
            })
        })
    }

    /// Export the tree into virtual host files.
    ///
    /// Refuses invalid trees. Rendering lives outside the core, so a valid
    /// tree reports `NotImplemented`; use [`export_with`](Self::export_with)
    /// to plug a renderer in.
    pub fn export(&self) -> Result<Vec<String>> {
        if !self.is_valid() {
            return Err(Error::InvalidTree);
        }
        Err(Error::NotImplemented(
            "virtual host rendering is provided by a Renderer".to_string(),
        ))
    }

    /// Hand every location of a valid tree to `renderer`
    pub fn export_with<R: Renderer>(&self, renderer: &R) -> Result<Vec<R::Output>> {
        if !self.is_valid() {
            return Err(Error::InvalidTree);
        }
        self.locations()
            .map(|view| renderer.render(&view.location))
            .collect()
    }
}

/// A location view together with the location's own validity
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedView<'a> {
    pub location: LocationView<'a>,
    pub valid: bool,
}

struct ListenMap<'a>(&'a BTreeMap<Address, Listen>);

impl Serialize for ListenMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (address, listen) in self.0 {
            map.serialize_entry(&address.to_string(), listen)?;
        }
        map.end()
    }
}

impl Serialize for ResolutionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResolutionTree", 3)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("directives", &self.directives)?;
        state.serialize_field("listens", &ListenMap(&self.listens))?;
        state.end()
    }
}

impl PartialEq for ResolutionTree {
    fn eq(&self, other: &Self) -> bool {
        self.directives == other.directives && self.listens == other.listens
    }
}
