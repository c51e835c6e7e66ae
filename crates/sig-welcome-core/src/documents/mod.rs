//! Parsers for the YAML documents that describe ownership.
//!
//! Two documents are read from repositories:
//!
//! - The relation document, mapping path patterns to owners, used to attribute
//!   a merge request's changed files to specific people
//! - A SIG's `sig-info.yaml` roster, listing its maintainers and committers
//!
//! Both parsers reject malformed input outright and treat empty input as an
//! empty document.
//!
//! # Example
//!
//! ```rust
//! use sig_welcome_core::documents::SigRoster;
//!
//! let roster = SigRoster::parse(b"maintainers:\n  - gitee_id: bob\n").unwrap();
//! assert!(roster.maintainers.contains("bob"));
//! assert!(roster.committers.is_empty());
//! ```

mod error;
mod relation;
mod roster;

pub use error::ParseError;
pub use relation::{OwnerEntry, OwnershipRule, RelationDocument};
pub use roster::SigRoster;

/// Returns true if the document has no content worth parsing.
fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(u8::is_ascii_whitespace)
}
