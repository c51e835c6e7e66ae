//! Capability traits for the code hosting platform.
//!
//! Ownership resolution and the welcome flow never talk to an API directly.
//! They go through two traits, so any platform client (or a test double) can
//! be plugged in:
//!
//! - [`RepositoryReader`]: file content, changed files, collaborators, trees
//! - [`EventWriter`]: comments and labels on the triggering issue or merge request

mod collaborator;
mod encoding;

pub use collaborator::{AccessLevel, Collaborator};
pub use encoding::{DecodeError, decode_transport, encode_transport};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies a repository as `org/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    /// The owning organization or namespace.
    pub org: String,
    /// The repository name.
    pub repo: String,
}

impl RepoId {
    /// Creates a repository id.
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo)
    }
}

/// A repository string that is not `org/repo`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid repository '{0}': expected 'org/repo'")]
pub struct InvalidRepoId(pub String);

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((org, repo)) if !org.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self::new(org, repo))
            }
            _ => Err(InvalidRepoId(s.to_string())),
        }
    }
}

impl TryFrom<String> for RepoId {
    type Error = InvalidRepoId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RepoId> for String {
    fn from(id: RepoId) -> Self {
        id.to_string()
    }
}

/// The issue or merge request that triggered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum EventTarget {
    /// A newly opened issue.
    Issue(u64),
    /// A newly opened merge request.
    MergeRequest(u64),
}

impl EventTarget {
    /// Returns the issue or merge request number.
    pub fn number(&self) -> u64 {
        match self {
            EventTarget::Issue(n) | EventTarget::MergeRequest(n) => *n,
        }
    }

    /// Returns the merge request number, if this is a merge request.
    pub fn merge_request(&self) -> Option<u64> {
        match self {
            EventTarget::MergeRequest(n) => Some(*n),
            EventTarget::Issue(_) => None,
        }
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTarget::Issue(n) => write!(f, "issue #{}", n),
            EventTarget::MergeRequest(n) => write!(f, "merge request !{}", n),
        }
    }
}

/// The content of a repository file, still in transport encoding.
///
/// A path that does not exist is reported as empty content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContent {
    /// Base64 content as returned by the API.
    pub content: String,
}

impl FileContent {
    /// Wraps transport-encoded content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Returns true if there is no content.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Decodes the content, see [`decode_transport`].
    pub fn decode(&self) -> Result<Vec<u8>, DecodeError> {
        decode_transport(&self.content)
    }
}

/// Errors that can occur when talking to the hosting platform.
#[derive(Debug, Clone, Error)]
pub enum HostingError {
    /// The API answered with an error.
    #[error("API error: {0}")]
    Api(String),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// Authentication or authorization failed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Read access to repositories on the hosting platform.
#[async_trait]
pub trait RepositoryReader: Send + Sync {
    /// Fetches a file at `branch`.
    ///
    /// Returns empty content, not an error, when the path does not exist.
    async fn fetch_path_content(
        &self,
        repo: &RepoId,
        path: &str,
        branch: &str,
    ) -> Result<FileContent, HostingError>;

    /// Lists the paths changed by a merge request.
    async fn fetch_changed_paths(
        &self,
        repo: &RepoId,
        merge_request: u64,
    ) -> Result<Vec<String>, HostingError>;

    /// Lists the repository's collaborators with their access levels.
    async fn fetch_collaborators(&self, repo: &RepoId) -> Result<Vec<Collaborator>, HostingError>;

    /// Lists every file path in the repository at `branch`.
    async fn fetch_tree(&self, repo: &RepoId, branch: &str) -> Result<Vec<String>, HostingError>;
}

/// Write access used to answer the triggering event.
#[async_trait]
pub trait EventWriter: Send + Sync {
    /// Posts a comment on the issue or merge request.
    async fn create_comment(
        &self,
        repo: &RepoId,
        target: EventTarget,
        body: &str,
    ) -> Result<(), HostingError>;

    /// Lists the names of the labels defined in the repository.
    async fn list_labels(&self, repo: &RepoId) -> Result<Vec<String>, HostingError>;

    /// Defines a new label in the repository.
    async fn create_label(&self, repo: &RepoId, name: &str) -> Result<(), HostingError>;

    /// Attaches a label to the issue or merge request.
    async fn add_label(
        &self,
        repo: &RepoId,
        target: EventTarget,
        name: &str,
    ) -> Result<(), HostingError>;
}
