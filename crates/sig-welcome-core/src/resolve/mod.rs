//! Owner resolution.
//!
//! Works out who to notify about a new issue or merge request. Resolution
//! runs an ordered list of strategies; each one either settles the answer,
//! steps aside for the next one, or fails:
//!
//! 1. [`PathTargetedStrategy`]: owners of the changed files per the relation
//!    document (merge requests only, when simplified welcome is enabled).
//!    Its failures are recoverable.
//! 2. [`RosterStrategy`]: the SIG's `sig-info.yaml` roster, or the
//!    repository's high-permission collaborators when no roster exists.
//!
//! # Example
//!
//! ```rust,ignore
//! use sig_welcome_core::resolve::{OwnerResolver, ResolutionContext};
//!
//! let ctx = ResolutionContext::new(&repo, "sig-storage", target, &config, &reader);
//! let owners = OwnerResolver::with_default_strategies().resolve(&ctx).await?;
//! ```

mod collaborators;
mod path_targeted;
mod roster;

pub use collaborators::fallback_maintainers;
pub use path_targeted::PathTargetedStrategy;
pub use roster::RosterStrategy;

use crate::Identity;
use crate::documents::ParseError;
use crate::hosting::{DecodeError, EventTarget, HostingError, RepoId, RepositoryReader};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

/// Placeholder for the SIG name in path templates.
pub const SIG_PLACEHOLDER: &str = "{sig}";

/// The people to notify.
///
/// Both lists are sorted and free of duplicates. An empty committers list is
/// normal: path-targeted resolution never names committers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Owners {
    /// Maintainers to mention.
    pub maintainers: Vec<Identity>,
    /// Committers to mention, possibly none.
    pub committers: Vec<Identity>,
}

impl Owners {
    /// Creates an owner set from the two roles.
    pub fn new<M, C>(maintainers: M, committers: C) -> Self
    where
        M: IntoIterator<Item = Identity>,
        C: IntoIterator<Item = Identity>,
    {
        Self {
            maintainers: sorted(maintainers),
            committers: sorted(committers),
        }
    }

    /// Creates an owner set without committers.
    pub fn maintainers_only<M>(maintainers: M) -> Self
    where
        M: IntoIterator<Item = Identity>,
    {
        Self::new(maintainers, std::iter::empty())
    }

    /// Returns true if committers are named.
    pub fn has_committers(&self) -> bool {
        !self.committers.is_empty()
    }
}

fn sorted(ids: impl IntoIterator<Item = Identity>) -> Vec<Identity> {
    let mut ids: Vec<_> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    ids
}

/// The parts of the bot configuration that drive owner resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionConfig {
    /// Enables path-targeted resolution for merge requests.
    pub simplified_welcome_enabled: bool,
    /// Path of the relation document.
    pub relation_file_path: String,
    /// Branch holding the relation document.
    pub relation_file_branch: String,
    /// Path of the SIG's `OWNERS` marker, with a `{sig}` placeholder.
    pub owners_path_template: String,
    /// Path of the SIG's roster, with a `{sig}` placeholder.
    pub sig_info_path_template: String,
    /// Branch holding the SIG files.
    pub sig_info_branch: String,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            simplified_welcome_enabled: false,
            relation_file_path: String::new(),
            relation_file_branch: String::new(),
            owners_path_template: "sig/{sig}/OWNERS".to_string(),
            sig_info_path_template: "sig/{sig}/sig-info.yaml".to_string(),
            sig_info_branch: "master".to_string(),
        }
    }
}

impl ResolutionConfig {
    /// Returns the `OWNERS` marker path for a SIG.
    pub fn owners_path(&self, sig: &str) -> String {
        self.owners_path_template.replace(SIG_PLACEHOLDER, sig)
    }

    /// Returns the roster path for a SIG.
    pub fn sig_info_path(&self, sig: &str) -> String {
        self.sig_info_path_template.replace(SIG_PLACEHOLDER, sig)
    }
}

/// Errors that stop owner resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A fetch without a fallback failed.
    #[error("failed to fetch {what} of {repo}: {source}")]
    Fetch {
        /// The repository being read.
        repo: RepoId,
        /// What was being fetched.
        what: String,
        /// The hosting failure.
        #[source]
        source: HostingError,
    },

    /// File content was not valid transport encoding.
    #[error("failed to decode {path} of {repo}: {source}")]
    Decode {
        /// The repository being read.
        repo: RepoId,
        /// The file path.
        path: String,
        /// The decoding failure.
        #[source]
        source: DecodeError,
    },

    /// A document was malformed.
    #[error("failed to parse {path} of {repo}: {source}")]
    Parse {
        /// The repository being read.
        repo: RepoId,
        /// The file path.
        path: String,
        /// The parse failure.
        #[source]
        source: ParseError,
    },

    /// The repository does not belong to any SIG.
    #[error("cannot find the SIG of repository {repo}")]
    SigNotFound {
        /// The repository.
        repo: RepoId,
    },

    /// Every strategy stepped aside.
    #[error("no owners found for repository {repo}")]
    NoOwners {
        /// The repository.
        repo: RepoId,
    },
}

impl ResolutionError {
    /// Creates a fetch error.
    pub fn fetch(repo: &RepoId, what: impl Into<String>, source: HostingError) -> Self {
        Self::Fetch {
            repo: repo.clone(),
            what: what.into(),
            source,
        }
    }

    /// Creates a decode error.
    pub fn decode(repo: &RepoId, path: impl Into<String>, source: DecodeError) -> Self {
        Self::Decode {
            repo: repo.clone(),
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(repo: &RepoId, path: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            repo: repo.clone(),
            path: path.into(),
            source,
        }
    }
}

/// Everything a strategy needs for one event.
pub struct ResolutionContext<'a> {
    /// The repository the event happened in.
    pub repo: &'a RepoId,
    /// The SIG owning the repository.
    pub sig: &'a str,
    /// The triggering issue or merge request.
    pub target: EventTarget,
    /// Resolution settings for the repository.
    pub config: &'a ResolutionConfig,
    /// Access to repository data.
    pub reader: &'a dyn RepositoryReader,
}

impl<'a> ResolutionContext<'a> {
    /// Creates a resolution context.
    pub fn new(
        repo: &'a RepoId,
        sig: &'a str,
        target: EventTarget,
        config: &'a ResolutionConfig,
        reader: &'a dyn RepositoryReader,
    ) -> Self {
        Self {
            repo,
            sig,
            target,
            config,
            reader,
        }
    }
}

impl std::fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("repo", &self.repo)
            .field("sig", &self.sig)
            .field("target", &self.target)
            .field("config", &self.config)
            .field("reader", &"<dyn RepositoryReader>")
            .finish()
    }
}

/// What a strategy concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The owners are settled.
    Resolved(Owners),
    /// The strategy does not apply; try the next one.
    Skipped(String),
}

/// One way of finding owners.
#[async_trait]
pub trait OwnerStrategy: Send + Sync {
    /// Returns the name of this strategy.
    fn name(&self) -> &'static str;

    /// Returns true if a failure should fall through to the next strategy.
    fn is_recoverable(&self) -> bool;

    /// Runs the strategy.
    async fn resolve(&self, ctx: &ResolutionContext<'_>)
    -> Result<StrategyOutcome, ResolutionError>;
}

/// Runs strategies in order until one settles the owners.
#[derive(Default)]
pub struct OwnerResolver {
    strategies: Vec<Box<dyn OwnerStrategy>>,
}

impl OwnerResolver {
    /// Creates a resolver without strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with the path-targeted and roster strategies.
    pub fn with_default_strategies() -> Self {
        let mut resolver = Self::new();
        resolver.add_strategy(PathTargetedStrategy::new());
        resolver.add_strategy(RosterStrategy::new());
        resolver
    }

    /// Appends a strategy.
    pub fn add_strategy<S: OwnerStrategy + 'static>(&mut self, strategy: S) {
        self.strategies.push(Box::new(strategy));
    }

    /// Returns the strategy names in order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolves the owners for one event.
    ///
    /// A recoverable failure is logged and the next strategy runs. If nothing
    /// settles the owners, the first recoverable failure is returned, or
    /// [`ResolutionError::NoOwners`] if there was none.
    pub async fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Owners, ResolutionError> {
        let mut first_error = None;

        for strategy in &self.strategies {
            debug!("Running owner strategy '{}' for {}", strategy.name(), ctx.repo);
            match strategy.resolve(ctx).await {
                Ok(StrategyOutcome::Resolved(owners)) => {
                    info!(
                        "Strategy '{}' resolved {} maintainer(s) and {} committer(s) for {}",
                        strategy.name(),
                        owners.maintainers.len(),
                        owners.committers.len(),
                        ctx.repo
                    );
                    return Ok(owners);
                }
                Ok(StrategyOutcome::Skipped(reason)) => {
                    debug!("Strategy '{}' skipped: {}", strategy.name(), reason);
                }
                Err(e) if strategy.is_recoverable() => {
                    warn!("Strategy '{}' failed, falling back: {}", strategy.name(), e);
                    first_error.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(first_error.unwrap_or_else(|| ResolutionError::NoOwners {
            repo: ctx.repo.clone(),
        }))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted [`RepositoryReader`] shared by the resolution tests.

    use crate::hosting::{
        Collaborator, FileContent, HostingError, RepoId, RepositoryReader, encode_transport,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockReader {
        files: HashMap<String, FileContent>,
        failing_files: HashMap<String, String>,
        changed: Option<Result<Vec<String>, String>>,
        collaborators: Option<Result<Vec<Collaborator>, String>>,
        tree: Option<Result<Vec<String>, String>>,
        fetched: Mutex<Vec<String>>,
    }

    impl MockReader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serves `raw` base64-encoded at `path`.
        pub fn with_file(mut self, path: &str, raw: &str) -> Self {
            self.files
                .insert(path.to_string(), FileContent::new(encode_transport(raw.as_bytes())));
            self
        }

        /// Serves `content` at `path` without encoding it.
        pub fn with_encoded_file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), FileContent::new(content));
            self
        }

        pub fn with_failing_file(mut self, path: &str, message: &str) -> Self {
            self.failing_files
                .insert(path.to_string(), message.to_string());
            self
        }

        pub fn with_changed_paths(mut self, paths: &[&str]) -> Self {
            self.changed = Some(Ok(paths.iter().map(|p| p.to_string()).collect()));
            self
        }

        pub fn with_failing_changes(mut self, message: &str) -> Self {
            self.changed = Some(Err(message.to_string()));
            self
        }

        pub fn with_collaborators(mut self, collaborators: Vec<Collaborator>) -> Self {
            self.collaborators = Some(Ok(collaborators));
            self
        }

        pub fn with_failing_collaborators(mut self, message: &str) -> Self {
            self.collaborators = Some(Err(message.to_string()));
            self
        }

        pub fn with_tree(mut self, paths: &[&str]) -> Self {
            self.tree = Some(Ok(paths.iter().map(|p| p.to_string()).collect()));
            self
        }

        pub fn with_failing_tree(mut self, message: &str) -> Self {
            self.tree = Some(Err(message.to_string()));
            self
        }

        /// Paths requested through `fetch_path_content`, in order.
        pub fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RepositoryReader for MockReader {
        async fn fetch_path_content(
            &self,
            _repo: &RepoId,
            path: &str,
            _branch: &str,
        ) -> Result<FileContent, HostingError> {
            self.fetched.lock().unwrap().push(path.to_string());
            if let Some(message) = self.failing_files.get(path) {
                return Err(HostingError::Api(message.clone()));
            }
            Ok(self.files.get(path).cloned().unwrap_or_default())
        }

        async fn fetch_changed_paths(
            &self,
            _repo: &RepoId,
            _merge_request: u64,
        ) -> Result<Vec<String>, HostingError> {
            match &self.changed {
                Some(Ok(paths)) => Ok(paths.clone()),
                Some(Err(message)) => Err(HostingError::Network(message.clone())),
                None => Ok(Vec::new()),
            }
        }

        async fn fetch_collaborators(
            &self,
            _repo: &RepoId,
        ) -> Result<Vec<Collaborator>, HostingError> {
            match &self.collaborators {
                Some(Ok(collaborators)) => Ok(collaborators.clone()),
                Some(Err(message)) => Err(HostingError::Api(message.clone())),
                None => Ok(Vec::new()),
            }
        }

        async fn fetch_tree(
            &self,
            _repo: &RepoId,
            _branch: &str,
        ) -> Result<Vec<String>, HostingError> {
            match &self.tree {
                Some(Ok(paths)) => Ok(paths.clone()),
                Some(Err(message)) => Err(HostingError::Api(message.clone())),
                None => Ok(Vec::new()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockReader;
    use super::*;
    use crate::hosting::{AccessLevel, Collaborator};

    const RELATIONS: &str = r#"
relations:
  - path: ["sig/storage", "docs/*/README"]
    owner:
      - gitee_id: alice
      - gitee_id: erin
"#;

    const SIG_INFO: &str = r#"
maintainers:
  - gitee_id: bob
committers:
  - gitee_id: carol
"#;

    fn repo() -> RepoId {
        RepoId::new("openeuler", "storage")
    }

    fn simplified() -> ResolutionConfig {
        ResolutionConfig {
            simplified_welcome_enabled: true,
            relation_file_path: "relations.yaml".to_string(),
            relation_file_branch: "master".to_string(),
            ..ResolutionConfig::default()
        }
    }

    fn ids(names: &[&str]) -> Vec<Identity> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn full_reader() -> MockReader {
        MockReader::new()
            .with_collaborators(vec![Collaborator::new("alice", AccessLevel::OWNER)])
            .with_file("sig/sig-storage/OWNERS", "maintainers:\n- bob\n")
            .with_file("sig/sig-storage/sig-info.yaml", SIG_INFO)
    }

    async fn resolve(
        reader: &MockReader,
        config: &ResolutionConfig,
        target: EventTarget,
    ) -> Result<Owners, ResolutionError> {
        let repo = repo();
        let ctx = ResolutionContext::new(&repo, "sig-storage", target, config, reader);
        OwnerResolver::with_default_strategies().resolve(&ctx).await
    }

    #[test]
    fn owners_are_sorted_and_deduplicated() {
        let owners = Owners::new(ids(&["zed", "amy", "zed"]), ids(&["bo", "al"]));
        assert_eq!(owners.maintainers, ids(&["amy", "zed"]));
        assert_eq!(owners.committers, ids(&["al", "bo"]));
        assert!(owners.has_committers());
        assert!(!Owners::maintainers_only(ids(&["a"])).has_committers());
    }

    #[test]
    fn config_paths_substitute_sig() {
        let config = ResolutionConfig::default();
        assert_eq!(config.owners_path("sig-net"), "sig/sig-net/OWNERS");
        assert_eq!(config.sig_info_path("sig-net"), "sig/sig-net/sig-info.yaml");
    }

    #[test]
    fn default_strategy_order() {
        let resolver = OwnerResolver::with_default_strategies();
        assert_eq!(resolver.strategy_names(), vec!["path-targeted", "roster"]);
    }

    #[tokio::test]
    async fn path_targeted_never_names_committers() {
        let reader = full_reader()
            .with_changed_paths(&["sig/storage/ceph.yaml"])
            .with_file("relations.yaml", RELATIONS);

        let owners = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        assert_eq!(owners.maintainers, ids(&["alice", "erin"]));
        assert!(owners.committers.is_empty());
    }

    #[tokio::test]
    async fn path_targeted_is_repeatable() {
        let reader = full_reader()
            .with_changed_paths(&["docs/api/README", "sig/storage/x"])
            .with_file("relations.yaml", RELATIONS);

        let first = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        let second = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn no_path_match_falls_back_to_roster() {
        let reader = full_reader()
            .with_changed_paths(&["src/main.c"])
            .with_file("relations.yaml", RELATIONS);

        let owners = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        assert_eq!(owners.maintainers, ids(&["bob"]));
        assert_eq!(owners.committers, ids(&["carol"]));
    }

    #[tokio::test]
    async fn issues_skip_path_targeted() {
        let reader = full_reader()
            .with_changed_paths(&["sig/storage/x"])
            .with_file("relations.yaml", RELATIONS);

        let owners = resolve(&reader, &simplified(), EventTarget::Issue(4))
            .await
            .unwrap();
        assert_eq!(owners.maintainers, ids(&["bob"]));
        assert!(!reader.fetched().contains(&"relations.yaml".to_string()));
    }

    #[tokio::test]
    async fn disabled_simplified_welcome_uses_roster() {
        let reader = full_reader()
            .with_changed_paths(&["sig/storage/x"])
            .with_file("relations.yaml", RELATIONS);

        let owners = resolve(&reader, &ResolutionConfig::default(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        assert_eq!(owners.maintainers, ids(&["bob"]));
        assert_eq!(owners.committers, ids(&["carol"]));
    }

    #[tokio::test]
    async fn roster_supersedes_collaborators() {
        let owners = resolve(&full_reader(), &ResolutionConfig::default(), EventTarget::Issue(1))
            .await
            .unwrap();
        assert_eq!(owners, Owners::new(ids(&["bob"]), ids(&["carol"])));
    }

    #[tokio::test]
    async fn relation_decode_failure_falls_through() {
        let reader = full_reader()
            .with_changed_paths(&["sig/storage/x"])
            .with_encoded_file("relations.yaml", "%%% not base64 %%%");

        let owners = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        assert_eq!(owners.maintainers, ids(&["bob"]));
    }

    #[tokio::test]
    async fn relation_parse_failure_falls_through() {
        let reader = full_reader()
            .with_changed_paths(&["sig/storage/x"])
            .with_file("relations.yaml", "relations: [unclosed");

        let owners = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        assert_eq!(owners.committers, ids(&["carol"]));
    }

    #[tokio::test]
    async fn changed_paths_failure_falls_through() {
        let reader = full_reader()
            .with_failing_changes("timeout")
            .with_file("relations.yaml", RELATIONS);

        let owners = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap();
        assert_eq!(owners.maintainers, ids(&["bob"]));
    }

    #[tokio::test]
    async fn collaborator_failure_is_fatal() {
        let reader = MockReader::new()
            .with_failing_collaborators("forbidden")
            .with_file("sig/sig-storage/OWNERS", "x")
            .with_file("sig/sig-storage/sig-info.yaml", SIG_INFO);

        let err = resolve(&reader, &ResolutionConfig::default(), EventTarget::Issue(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Fetch { .. }));
    }

    #[tokio::test]
    async fn fatal_error_wins_over_recorded_recoverable_error() {
        let reader = MockReader::new()
            .with_changed_paths(&["sig/storage/x"])
            .with_failing_file("relations.yaml", "boom")
            .with_failing_collaborators("forbidden");

        let err = resolve(&reader, &simplified(), EventTarget::MergeRequest(1))
            .await
            .unwrap_err();
        match err {
            ResolutionError::Fetch { what, .. } => assert_eq!(what, "collaborators"),
            other => panic!("Expected collaborator fetch error, got {other:?}"),
        }
    }

    struct Skipping;

    #[async_trait]
    impl OwnerStrategy for Skipping {
        fn name(&self) -> &'static str {
            "skipping"
        }

        fn is_recoverable(&self) -> bool {
            true
        }

        async fn resolve(
            &self,
            _ctx: &ResolutionContext<'_>,
        ) -> Result<StrategyOutcome, ResolutionError> {
            Ok(StrategyOutcome::Skipped("never applies".to_string()))
        }
    }

    #[tokio::test]
    async fn all_skipped_is_no_owners() {
        let mut resolver = OwnerResolver::new();
        resolver.add_strategy(Skipping);
        let reader = MockReader::new();
        let repo = repo();
        let config = ResolutionConfig::default();
        let ctx = ResolutionContext::new(&repo, "sig-storage", EventTarget::Issue(1), &config, &reader);

        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(matches!(err, ResolutionError::NoOwners { .. }));
    }

    #[tokio::test]
    async fn first_recoverable_error_is_reported_when_nothing_resolves() {
        let mut resolver = OwnerResolver::new();
        resolver.add_strategy(PathTargetedStrategy::new());
        resolver.add_strategy(Skipping);
        let reader = MockReader::new()
            .with_changed_paths(&["a"])
            .with_encoded_file("relations.yaml", "!!!");
        let repo = repo();
        let config = simplified();
        let ctx = ResolutionContext::new(&repo, "sig-storage", EventTarget::MergeRequest(1), &config, &reader);

        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(matches!(err, ResolutionError::Decode { .. }));
    }
}
