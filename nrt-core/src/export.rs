//! Hand-off to virtual-host renderers
//!
//! The core does not write configuration files. A renderer receives one
//! [`LocationView`] per location of a valid tree and decides what to do with
//! it.

use crate::address::Address;
use crate::error::Result;
use crate::language::Language;
use serde::Serialize;
use serde_json::Value;

/// Everything a renderer needs to know about one location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView<'a> {
    pub address: Address,
    pub domain: &'a str,
    pub path: &'a str,
    pub aliases: &'a [String],
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub language: &'a Language,
    pub language_configuration: Value,
}

/// Position of a location in the tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LocationKey {
    pub address: Address,
    pub domain: String,
    pub path: String,
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}{}", self.address, self.domain, self.path)
    }
}

/// Turns locations of a valid tree into rendered output
pub trait Renderer {
    type Output;

    fn render(&self, location: &LocationView<'_>) -> Result<Self::Output>;
}
