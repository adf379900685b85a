//! Directives: the raw input records of the resolution tree
//!
//! A directive is `{ "signature": "alias:ip:port:server_name:location",
//! "parameters": { ... } }`. Everything a directive carries is validated when
//! it is constructed, so an accepted directive can always be walked down to
//! its location without failing half way.

use crate::access::ALL;
use crate::address::Address;
use crate::error::{Error, Result};
use crate::language::Language;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// `alias:ip:port:server_name:location`
static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+):([\w.]+):(\d+):([\w.]+):([\w/]+)$").expect("signature pattern compiles")
});

const SIGNATURE_FORMAT: &str = "expected 'alias:ip:port:server_name:location'";

/// A decoded, validated directive signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    alias: String,
    address: Address,
    server_name: String,
    location: String,
}

impl Signature {
    /// Parse and validate a signature string
    pub fn parse(raw: &str) -> Result<Self> {
        let caps = SIGNATURE_RE
            .captures(raw)
            .ok_or_else(|| Error::format("signature", raw, SIGNATURE_FORMAT))?;
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let address = Address::parse(field(2), field(3))?;
        let location = field(5);
        validate_location(location)?;

        Ok(Self {
            alias: field(1).to_string(),
            address,
            server_name: field(4).to_string(),
            location: location.to_string(),
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Canonical form; the port is printed without leading zeros
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.alias,
            self.address.ip(),
            self.address.port(),
            self.server_name,
            self.location
        )
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A location path is non-empty and framed by `/` on both ends
pub(crate) fn validate_location(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::MissingField { field: "location" });
    }
    if !(path.starts_with('/') && path.ends_with('/')) {
        return Err(Error::format(
            "location",
            path,
            "must start and end with a forward slash",
        ));
    }
    Ok(())
}

/// Optional routing parameters attached to a directive
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters {
    allow: Vec<String>,
    deny: Vec<String>,
    language: Option<Language>,
}

impl Parameters {
    /// Decode a parameter bag. Unknown keys are ignored.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            allow: rule_tokens("allow", map.get("allow"))?,
            deny: rule_tokens("deny", map.get("deny"))?,
            language: Language::from_parameters(map)?,
        })
    }

    pub fn with_allow<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn with_deny<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn allow(&self) -> &[String] {
        &self.allow
    }

    pub fn deny(&self) -> &[String] {
        &self.deny
    }

    /// `None` when the directive did not mention a language
    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty() && self.language.is_none()
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if !self.allow.is_empty() {
            map.insert("allow".to_string(), Value::from(self.allow.clone()));
        }
        if !self.deny.is_empty() {
            map.insert("deny".to_string(), Value::from(self.deny.clone()));
        }
        if let Some(language) = &self.language {
            language.write_parameters(&mut map);
        }
        map
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// `allow` / `deny` value: list of strings or null
fn rule_tokens(field: &'static str, value: Option<&Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(token) if token.is_empty() => {
                    Err(Error::format(field, "", "rule tokens cannot be empty"))
                }
                Value::String(token) => Ok(token.clone()),
                other => Err(Error::mismatch(field, "string", other)),
            })
            .collect(),
        // a bare "all" is common enough in hand written batches
        Some(Value::String(token)) if token == ALL => Ok(vec![ALL.to_string()]),
        Some(other) => Err(Error::mismatch(field, "array of strings", other)),
    }
}

/// One input record: where a container wants to be served
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    signature: Signature,
    #[serde(skip_serializing_if = "Parameters::is_empty")]
    parameters: Parameters,
}

impl Directive {
    pub fn new(signature: &str, parameters: Parameters) -> Result<Self> {
        Ok(Self {
            signature: Signature::parse(signature)?,
            parameters,
        })
    }

    /// A directive with no parameters
    pub fn parse(signature: &str) -> Result<Self> {
        Self::new(signature, Parameters::default())
    }

    /// Decode a directive record from its JSON shape
    pub fn from_value(value: &Value) -> Result<Self> {
        let record = match value {
            Value::Null => return Err(Error::MissingField { field: "directive" }),
            Value::Object(record) => record,
            other => return Err(Error::mismatch("directive", "object", other)),
        };

        let signature = match record.get("signature") {
            None | Some(Value::Null) => return Err(Error::MissingField { field: "signature" }),
            Some(Value::String(signature)) => signature,
            Some(other) => return Err(Error::mismatch("signature", "string", other)),
        };

        let parameters = match record.get("parameters") {
            None | Some(Value::Null) => Parameters::default(),
            Some(Value::Object(map)) => Parameters::from_map(map)?,
            Some(other) => return Err(Error::mismatch("parameters", "object", other)),
        };

        Self::new(signature, parameters)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

impl TryFrom<&Value> for Directive {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl TryFrom<Value> for Directive {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}
