//! TOML batch adapter
//!
//! ```toml
//! [[directive]]
//! signature = "app1:0.0.0.0:80:example.com:/"
//!
//! [directive.parameters]
//! allow = ["10.0.0.0/8"]
//! language = "python"
//! ```

use crate::{decode_records, LoadError};
use nrt_core::Directive;
use serde_json::Value;

/// TOML batch adapter
pub struct TomlAdapter;

impl TomlAdapter {
    /// Parse a TOML batch
    pub fn parse(input: &str) -> Result<Vec<Directive>, LoadError> {
        let document: Value = toml::from_str(input)?;
        match document.get("directive") {
            Some(Value::Array(records)) => decode_records(records),
            Some(_) => Err(LoadError::Shape(
                "'directive' must be an array of tables".to_string(),
            )),
            // an empty file is an empty batch
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tables() {
        let directives = TomlAdapter::parse(
            r#"
                [[directive]]
                signature = "app1:0.0.0.0:80:example.com:/"

                [[directive]]
                signature = "app2:0.0.0.0:80:example.com:/py/"

                [directive.parameters]
                language = "python"

                [directive.parameters.gunicorn]
                port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(directives.len(), 2);
        let language = directives[1].parameters().language().unwrap();
        assert_eq!(language.name(), "python");
        assert_eq!(language.configuration()["port"], 9000);
        assert_eq!(language.configuration()["ip"], "127.0.0.1");
    }

    #[test]
    fn test_parse_empty() {
        assert!(TomlAdapter::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_wrong_shape() {
        assert!(matches!(
            TomlAdapter::parse(r#"directive = "app1:0.0.0.0:80:example.com:/""#),
            Err(LoadError::Shape(_))
        ));
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(matches!(TomlAdapter::parse("[[directive"), Err(LoadError::Toml(_))));
    }
}
