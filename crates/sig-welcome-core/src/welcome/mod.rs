//! The welcome flow for a newly opened issue or merge request.
//!
//! For each event the handler finds the owning SIG, resolves who to notify,
//! posts a welcome comment naming them and attaches the `sig/<name>` label.
//! If the SIG or the owners cannot be determined nothing is posted.

mod template;

pub use template::render_comment;

use crate::config::BotConfig;
use crate::hosting::{EventTarget, EventWriter, HostingError, RepoId, RepositoryReader};
use crate::resolve::{OwnerResolver, Owners, ResolutionContext, ResolutionError};
use crate::sig::{locate_sig, sig_label};
use log::{debug, error, info, warn};
use serde::Serialize;
use thiserror::Error;

/// A newly opened issue or merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeEvent {
    /// The repository it was opened in.
    pub repo: RepoId,
    /// The issue or merge request.
    pub target: EventTarget,
    /// Username of the person who opened it.
    pub author: String,
}

impl WelcomeEvent {
    /// Creates a welcome event.
    pub fn new(repo: RepoId, target: EventTarget, author: impl Into<String>) -> Self {
        Self {
            repo,
            target,
            author: author.into(),
        }
    }
}

/// What the handler did for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeOutcome {
    /// The SIG owning the repository.
    pub sig: String,
    /// The label attached.
    pub label: String,
    /// The people named in the comment.
    pub owners: Owners,
    /// The comment body posted.
    pub comment: String,
}

/// Errors from handling a welcome event.
#[derive(Debug, Error)]
pub enum WelcomeError {
    /// The SIG or the owners could not be determined; nothing was posted.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Posting the comment or attaching the label failed.
    #[error("{} delivery step(s) failed: {}", errors.len(), join_errors(errors))]
    Delivery {
        /// What was resolved and attempted.
        outcome: Box<WelcomeOutcome>,
        /// The failed steps.
        errors: Vec<HostingError>,
    },
}

fn join_errors(errors: &[HostingError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Handles welcome events for repositories sharing one config item.
pub struct WelcomeHandler<'a> {
    reader: &'a dyn RepositoryReader,
    writer: &'a dyn EventWriter,
    config: &'a BotConfig,
    resolver: OwnerResolver,
}

impl<'a> WelcomeHandler<'a> {
    /// Creates a handler using the default resolution strategies.
    pub fn new(
        reader: &'a dyn RepositoryReader,
        writer: &'a dyn EventWriter,
        config: &'a BotConfig,
    ) -> Self {
        Self::with_resolver(reader, writer, config, OwnerResolver::with_default_strategies())
    }

    /// Creates a handler with a custom resolver.
    pub fn with_resolver(
        reader: &'a dyn RepositoryReader,
        writer: &'a dyn EventWriter,
        config: &'a BotConfig,
        resolver: OwnerResolver,
    ) -> Self {
        Self {
            reader,
            writer,
            config,
            resolver,
        }
    }

    /// Resolves the SIG and the owners for an event without writing anything.
    pub async fn resolve(&self, event: &WelcomeEvent) -> Result<(String, Owners), ResolutionError> {
        let sig = locate_sig(self.reader, &event.repo, self.config).await?;
        let resolution = self.config.resolution_config();
        let ctx = ResolutionContext::new(&event.repo, &sig, event.target, &resolution, self.reader);
        let owners = self.resolver.resolve(&ctx).await?;
        Ok((sig, owners))
    }

    /// Handles one event.
    ///
    /// Failing to post the comment or attach the label does not stop the
    /// remaining steps; all such failures are reported together. Failing to
    /// create a missing label is only logged, attaching it may still work.
    pub async fn handle(&self, event: &WelcomeEvent) -> Result<WelcomeOutcome, WelcomeError> {
        info!("Welcoming {} on {} in {}", event.author, event.target, event.repo);

        let (sig, owners) = self.resolve(event).await?;
        let comment = render_comment(self.config, &event.author, &sig, &owners);
        let label = sig_label(&sig);
        let mut errors = Vec::new();

        if let Err(e) = self
            .writer
            .create_comment(&event.repo, event.target, &comment)
            .await
        {
            warn!("Failed to comment on {} in {}: {}", event.target, event.repo, e);
            errors.push(e);
        }

        if let Err(e) = self.ensure_label(&event.repo, &label).await {
            error!("Failed to create label {} in {}: {}", label, event.repo, e);
        }

        if let Err(e) = self.writer.add_label(&event.repo, event.target, &label).await {
            warn!("Failed to add label {} to {}: {}", label, event.target, e);
            errors.push(e);
        }

        let outcome = WelcomeOutcome {
            sig,
            label,
            owners,
            comment,
        };
        if errors.is_empty() {
            Ok(outcome)
        } else {
            Err(WelcomeError::Delivery {
                outcome: Box::new(outcome),
                errors,
            })
        }
    }

    /// Creates the label unless the repository already defines it.
    async fn ensure_label(&self, repo: &RepoId, label: &str) -> Result<(), HostingError> {
        let labels = self.writer.list_labels(repo).await?;
        if labels.iter().any(|l| l == label) {
            debug!("Label {} already exists in {}", label, repo);
            return Ok(());
        }
        debug!("Creating label {} in {}", label, repo);
        self.writer.create_label(repo, label).await
    }
}

impl std::fmt::Debug for WelcomeHandler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WelcomeHandler")
            .field("reader", &"<dyn RepositoryReader>")
            .field("writer", &"<dyn EventWriter>")
            .field("config", &self.config)
            .field("strategies", &self.resolver.strategy_names())
            .finish()
    }
}
