//! NRT Directive Loader
//!
//! Sources directive batches from disk and hands them to the resolution
//! engine. A batch is either a JSON document or a TOML document; a directory
//! is read file by file in name order.
//!
//! # Example
//!
//! ```rust,ignore
//! let tree = nrt_config::resolve_path("directives.json")?;
//! assert!(tree.is_valid());
//! ```

pub mod adapter;

pub use adapter::{JsonAdapter, TomlAdapter};

use nrt_core::{Directive, ResolutionTree};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Loading error
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unexpected document shape: {0}")]
    Shape(String),

    #[error("Unknown batch format: '{0}'")]
    UnknownFormat(String),

    #[error("Directive #{index}: {source}")]
    Directive {
        index: usize,
        #[source]
        source: nrt_core::Error,
    },

    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },

    #[error("Resolution failed: {0}")]
    Resolve(#[from] nrt_core::Error),
}

/// Decode raw directive records, reporting the index of the first bad one
pub(crate) fn decode_records(records: &[Value]) -> Result<Vec<Directive>, LoadError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Directive::from_value(record).map_err(|source| LoadError::Directive { index, source })
        })
        .collect()
}

/// Load a single batch file, picking the format from its extension
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Directive>, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let directives = match ext {
        "json" => JsonAdapter::parse(&content),
        "toml" => TomlAdapter::parse(&content),
        _ => Err(LoadError::UnknownFormat(ext.to_string())),
    }?;

    tracing::debug!("📄 Loaded {} directive(s) from {}", directives.len(), path.display());
    Ok(directives)
}

/// Load every `.json` / `.toml` file of a directory, in file name order
pub fn load_directory(path: impl AsRef<Path>) -> Result<Vec<Directive>, LoadError> {
    let path = path.as_ref();
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let file = entry.map_err(io_err)?.path();
        let supported = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == "json" || ext == "toml");
        if supported && file.is_file() {
            files.push(file);
        }
    }
    files.sort();

    let mut directives = Vec::new();
    for file in files {
        let batch = load_file(&file).map_err(|source| LoadError::File {
            path: file.clone(),
            source: Box::new(source),
        })?;
        directives.extend(batch);
    }

    tracing::info!("📁 Loaded {} directive(s) from directory {}", directives.len(), path.display());
    Ok(directives)
}

/// Load a file or a directory
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<Directive>, LoadError> {
    let path = path.as_ref();
    if path.is_dir() {
        load_directory(path)
    } else {
        load_file(path)
    }
}

/// Load a file or a directory and resolve it into a tree
pub fn resolve_path(path: impl AsRef<Path>) -> Result<ResolutionTree, LoadError> {
    let directives = load_path(path)?;
    let total = directives.len();
    let tree = ResolutionTree::from_directives(directives)?;
    if tree.len() < total {
        tracing::info!("Dropped {} duplicate directive(s)", total - tree.len());
    }
    Ok(tree)
}

/// Serialize a batch back to pretty JSON
pub fn to_json(directives: &[Directive]) -> Result<String, LoadError> {
    Ok(serde_json::to_string_pretty(directives)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"[{"signature": "app1:0.0.0.0:80:example.com:/"}]"#,
        )
        .unwrap();

        let directives = load_file(&path).unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].signature().alias(), "app1");
    }

    #[test]
    fn test_load_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.yaml");
        fs::write(&path, "directives: []").unwrap();
        assert!(matches!(load_file(&path), Err(LoadError::UnknownFormat(ext)) if ext == "yaml"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_file(dir.path().join("missing.json")),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_load_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("20-api.toml"),
            r#"
                [[directive]]
                signature = "api:0.0.0.0:80:example.com:/api/"
            "#,
        )
        .unwrap();
        fs::write(
            dir.path().join("10-web.json"),
            r#"{"directives": [{"signature": "web:0.0.0.0:80:example.com:/"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let directives = load_directory(dir.path()).unwrap();
        let aliases: Vec<_> = directives.iter().map(|d| d.signature().alias()).collect();
        assert_eq!(aliases, ["web", "api"]);
    }

    #[test]
    fn test_load_directory_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), r#"[{"signature": 1}]"#).unwrap();

        let err = load_directory(dir.path()).unwrap_err();
        match err {
            LoadError::File { path, source } => {
                assert!(path.ends_with("bad.json"));
                assert!(matches!(*source, LoadError::Directive { index: 0, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"[
                {"signature": "app1:0.0.0.0:80:example.com:/"},
                {"signature": "app1:0.0.0.0:80:example.com:/"},
                {"signature": "app2:0.0.0.0:80:example.com:/"}
            ]"#,
        )
        .unwrap();

        let tree = resolve_path(&path).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(!tree.is_valid());
    }

    #[test]
    fn test_to_json() {
        let directives = vec![Directive::parse("app1:0.0.0.0:80:example.com:/").unwrap()];
        let json = to_json(&directives).unwrap();
        let reparsed = JsonAdapter::parse(&json).unwrap();
        assert_eq!(reparsed, directives);
    }
}
