//! SIG Welcome Core
//!
//! A library for working out who should be told about a new issue or merge
//! request in a repository managed by a special-interest group (SIG).
//!
//! # Features
//!
//! - **Pattern matching**: Attribute changed files to owners through a relation document
//! - **Roster loading**: Read a SIG's maintainers and committers from `sig-info.yaml`
//! - **Collaborator fallback**: Derive maintainers from repository permission levels
//! - **Welcome flow**: Post a welcome comment and attach the `sig/<name>` label
//!
//! # Quick Start
//!
//! ```rust
//! use sig_welcome_core::documents::RelationDocument;
//!
//! let input = br#"
//! relations:
//!   - path: ["docs/*/README"]
//!     owner:
//!       - gitee_id: alice
//! "#;
//!
//! let document = RelationDocument::parse(input).unwrap();
//! let owners = document.owners_for(["docs/apiserver/README"]).unwrap();
//! assert!(owners.contains("alice"));
//! ```
//!
//! # Modules
//!
//! - [`matching`]: Path pattern matching for relation rules
//! - [`documents`]: Relation and roster document parsing
//! - [`hosting`]: Capability traits for the code hosting platform
//! - [`resolve`]: Owner resolution strategies and orchestration
//! - [`sig`]: Locating the SIG that owns a repository
//! - [`config`]: Per-repository bot configuration
//! - [`welcome`]: The per-event welcome handler

pub mod config;
pub mod documents;
pub mod hosting;
pub mod matching;
pub mod resolve;
pub mod sig;
pub mod welcome;

/// A username on the hosting platform. Compared exactly, without normalization.
pub type Identity = String;

// Re-export commonly used types at the crate root
pub use config::{BotConfig, ConfigError, Configuration};
pub use hosting::{EventTarget, EventWriter, RepoId, RepositoryReader};
pub use resolve::{OwnerResolver, Owners, ResolutionConfig, ResolutionContext, ResolutionError};
pub use welcome::{WelcomeError, WelcomeEvent, WelcomeHandler, WelcomeOutcome};
