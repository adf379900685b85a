//! Language runtimes a location can be served with
//!
//! A location is plain `html` unless a directive asks for `php` (served
//! through php-fpm) or `python` (served through gunicorn). The runtime
//! settings travel with the variant so a renderer never sees a python
//! location without a gunicorn upstream.

use crate::address::{parse_ipv4, port_from_value};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::net::Ipv4Addr;

/// Parameter key selecting the language
pub const LANGUAGE_KEY: &str = "language";

/// Parameter key holding php-fpm settings
pub const PHPFPM_KEY: &str = "phpfpm";

/// Historical spelling of [`PHPFPM_KEY`], still accepted on input
pub const PHPFPM_KEY_LEGACY: &str = "phpfmp";

/// Parameter key holding gunicorn settings
pub const GUNICORN_KEY: &str = "gunicorn";

/// Default gunicorn bind IP
pub const GUNICORN_DEFAULT_IP: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Default gunicorn bind port
pub const GUNICORN_DEFAULT_PORT: u16 = 8000;

/// Language a location is served with, carrying its runtime configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Language {
    #[default]
    Html,
    Php(PhpFpmConfig),
    Python(GunicornConfig),
}

/// php-fpm settings, carried verbatim
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PhpFpmConfig {
    settings: Map<String, Value>,
}

impl PhpFpmConfig {
    pub fn new(settings: Map<String, Value>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }
}

/// gunicorn upstream settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GunicornConfig {
    #[serde(serialize_with = "serialize_display")]
    ip: Ipv4Addr,
    port: u16,
    /// Any further keys, passed through untouched
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for GunicornConfig {
    fn default() -> Self {
        Self {
            ip: GUNICORN_DEFAULT_IP,
            port: GUNICORN_DEFAULT_PORT,
            extra: Map::new(),
        }
    }
}

impl GunicornConfig {
    /// Build from a parameter sub-object, injecting the default ip and port
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut config = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "ip" => match value {
                    Value::Null => {}
                    Value::String(ip) => config.ip = parse_ipv4("gunicorn.ip", ip)?,
                    other => return Err(Error::mismatch("gunicorn.ip", "string", other)),
                },
                "port" => {
                    if !value.is_null() {
                        config.port = port_from_value("gunicorn.port", value)?;
                    }
                }
                _ => {
                    config.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(config)
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

fn serialize_display<T: fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl Language {
    /// Decode the language of a directive's parameter bag.
    ///
    /// Returns `None` when the bag does not mention a language at all, so the
    /// caller can keep whatever the location already has.
    pub fn from_parameters(parameters: &Map<String, Value>) -> Result<Option<Self>> {
        let name = match parameters.get(LANGUAGE_KEY) {
            None => return Ok(None),
            Some(Value::Null) => return Ok(Some(Language::Html)),
            Some(Value::String(name)) => name.as_str(),
            Some(other) => return Err(Error::mismatch(LANGUAGE_KEY, "string", other)),
        };

        let language = match name {
            "html" => Language::Html,
            "php" => {
                let settings = runtime_section(parameters, &[PHPFPM_KEY, PHPFPM_KEY_LEGACY])?;
                Language::Php(PhpFpmConfig::new(settings.cloned().unwrap_or_default()))
            }
            "python" => match runtime_section(parameters, &[GUNICORN_KEY])? {
                Some(map) => Language::Python(GunicornConfig::from_map(map)?),
                None => Language::Python(GunicornConfig::default()),
            },
            other => {
                return Err(Error::format(
                    LANGUAGE_KEY,
                    other,
                    "expected one of html, php, python",
                ));
            }
        };
        Ok(Some(language))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Html => "html",
            Language::Php(_) => "php",
            Language::Python(_) => "python",
        }
    }

    /// Runtime configuration as a plain mapping
    pub fn configuration(&self) -> Value {
        match self {
            Language::Html => Value::Object(Map::new()),
            Language::Php(config) => Value::Object(config.settings.clone()),
            Language::Python(config) => serde_json::to_value(config)
                .unwrap_or_else(|_| Value::Object(Map::new())),
        }
    }

    /// Write this language back into a parameter bag
    pub(crate) fn write_parameters(&self, parameters: &mut Map<String, Value>) {
        parameters.insert(LANGUAGE_KEY.to_string(), Value::String(self.name().to_string()));
        match self {
            Language::Html => {}
            Language::Php(_) => {
                parameters.insert(PHPFPM_KEY.to_string(), self.configuration());
            }
            Language::Python(_) => {
                parameters.insert(GUNICORN_KEY.to_string(), self.configuration());
            }
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Language {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// First present, non-null object among `keys`
fn runtime_section<'a>(
    parameters: &'a Map<String, Value>,
    keys: &[&'static str],
) -> Result<Option<&'a Map<String, Value>>> {
    for key in keys {
        match parameters.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(map)) => return Ok(Some(map)),
            Some(other) => return Err(Error::mismatch(*key, "object", other)),
        }
    }
    Ok(None)
}
