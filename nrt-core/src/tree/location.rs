//! Location: the path-level node of the tree
//!
//! A location is identified by its path and collects every container alias
//! that asked to be served there. Serving one path from two containers is
//! a conflict, so a location is only valid with exactly one alias.

use crate::access::AccessList;
use crate::directive::{validate_location, Directive};
use crate::error::{Error, Result};
use crate::language::Language;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

/// A unique location within a server name
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    path: String,
    aliases: Vec<String>,
    allow: AccessList,
    deny: AccessList,
    language: Language,
}

impl Location {
    /// Create an empty location; the path must start and end with `/`
    pub fn new(path: &str) -> Result<Self> {
        validate_location(path)?;
        Ok(Self::unchecked(path))
    }

    /// For paths that already passed signature validation
    pub(crate) fn unchecked(path: &str) -> Self {
        Self {
            path: path.to_string(),
            aliases: Vec::new(),
            allow: AccessList::allow(),
            deny: AccessList::deny(),
            language: Language::Html,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bound aliases, in the order they were first seen
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn allow(&self) -> &AccessList {
        &self.allow
    }

    pub fn deny(&self) -> &AccessList {
        &self.deny
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn language_configuration(&self) -> Value {
        self.language.configuration()
    }

    /// Bind a container alias. Binding the same alias twice is a no-op.
    pub fn add_alias(&mut self, alias: &str) -> Result<()> {
        if alias.is_empty() {
            return Err(Error::MissingField { field: "alias" });
        }
        self.bind_alias(alias);
        Ok(())
    }

    fn bind_alias(&mut self, alias: &str) {
        if !self.aliases.iter().any(|a| a == alias) {
            self.aliases.push(alias.to_string());
        }
    }

    pub fn merge_allow(&mut self, tokens: &[String]) {
        self.allow = self.allow.merged(tokens);
    }

    pub fn merge_deny(&mut self, tokens: &[String]) {
        self.deny = self.deny.merged(tokens);
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Fold a directive targeting this location into it
    pub(crate) fn absorb(&mut self, directive: &Directive) {
        // the signature grammar guarantees a non-empty alias
        self.bind_alias(directive.signature().alias());

        let params = directive.parameters();
        self.merge_allow(params.allow());
        self.merge_deny(params.deny());
        if let Some(language) = params.language() {
            self.set_language(language.clone());
        }
    }

    /// Exactly one alias, and an access policy that is neither
    /// allow-all + deny-all nor allow-none + deny-none
    pub fn is_valid(&self) -> bool {
        self.aliases.len() == 1
            && !(self.allow.is_all() && self.deny.is_all())
            && !(self.allow.is_empty() && self.deny.is_empty())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Location", 7)?;
        state.serialize_field("location", &self.path)?;
        state.serialize_field("alias", &self.aliases)?;
        state.serialize_field("allow", &self.allow)?;
        state.serialize_field("deny", &self.deny)?;
        state.serialize_field("language", &self.language)?;
        state.serialize_field("language_configuration", &self.language_configuration())?;
        state.serialize_field("valid", &self.is_valid())?;
        state.end()
    }
}
