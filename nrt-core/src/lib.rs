//! NRT Core Library
//!
//! Resolves a flat batch of container directives into a validated
//! Listen → ServerName → Location hierarchy, ready to be rendered into
//! virtual host configuration.
//!
//! # Example
//!
//! ```rust
//! use nrt_core::{CheckedView, Directive, ResolutionTree};
//!
//! let mut tree = ResolutionTree::new();
//! tree.add_directive(Directive::parse("app1:0.0.0.0:80:example.com:/").unwrap()).unwrap();
//! tree.add_directive(Directive::parse("app2:0.0.0.0:80:example.com:/api/").unwrap()).unwrap();
//!
//! assert!(tree.is_valid());
//! let views: Vec<CheckedView<'_>> = tree.locations().collect();
//! assert_eq!(views.len(), 2);
//! assert!(views.iter().all(|view| view.valid));
//! ```

pub mod access;
pub mod address;
pub mod directive;
pub mod error;
pub mod export;
pub mod language;
pub mod tree;

pub use access::{AccessList, RuleSet};
pub use address::Address;
pub use directive::{Directive, Parameters, Signature};
pub use error::{Error, Result};
pub use export::{LocationKey, LocationView, Renderer};
pub use language::{GunicornConfig, Language, PhpFpmConfig};
pub use tree::{CheckedView, Listen, Location, ResolutionTree, ServerName};

/// NRT version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
