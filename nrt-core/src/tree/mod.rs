//! The resolution tree: ResolutionTree → Listen → ServerName → Location
//!
//! Each level exclusively owns the level below it, keyed by address, domain
//! and path respectively. Nothing points back up, and nothing is ever removed
//! once created. Validity is never stored; every `is_valid` walks the
//! subtree.

mod listen;
mod location;
mod resolution;
mod server_name;

pub use listen::Listen;
pub use location::Location;
pub use resolution::{CheckedView, ResolutionTree};
pub use server_name::ServerName;
