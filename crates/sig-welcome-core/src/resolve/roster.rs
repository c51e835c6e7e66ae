//! Owners from the SIG roster, with the collaborator fallback.

use super::{
    OwnerStrategy, Owners, ResolutionContext, ResolutionError, StrategyOutcome,
    fallback_maintainers,
};
use crate::documents::SigRoster;
use crate::hosting::FileContent;
use async_trait::async_trait;
use log::{debug, warn};

/// Resolves owners from the SIG's `sig-info.yaml`.
///
/// The repository's developer/maintainer/owner collaborators form a baseline
/// that is returned, without committers, when the SIG's `OWNERS` marker or its
/// roster is missing, empty or cannot be fetched. A roster that loads replaces
/// the baseline entirely.
///
/// Failing to list collaborators is fatal, as is a roster that cannot be
/// decoded or parsed.
#[derive(Debug, Clone, Default)]
pub struct RosterStrategy;

impl RosterStrategy {
    /// Creates a new roster strategy.
    pub fn new() -> Self {
        Self
    }

    /// Fetches a SIG file, treating failures and empty content as absent.
    async fn fetch_gate(&self, ctx: &ResolutionContext<'_>, path: &str) -> Option<FileContent> {
        match ctx
            .reader
            .fetch_path_content(ctx.repo, path, &ctx.config.sig_info_branch)
            .await
        {
            Ok(content) if !content.is_empty() => Some(content),
            Ok(_) => {
                debug!("{} is missing or empty in {}", path, ctx.repo);
                None
            }
            Err(e) => {
                warn!("Failed to fetch {} from {}: {}", path, ctx.repo, e);
                None
            }
        }
    }
}

#[async_trait]
impl OwnerStrategy for RosterStrategy {
    fn name(&self) -> &'static str {
        "roster"
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext<'_>,
    ) -> Result<StrategyOutcome, ResolutionError> {
        let collaborators = ctx
            .reader
            .fetch_collaborators(ctx.repo)
            .await
            .map_err(|e| ResolutionError::fetch(ctx.repo, "collaborators", e))?;
        let baseline = fallback_maintainers(&collaborators);
        debug!(
            "{} of {} collaborator(s) qualify as fallback maintainers",
            baseline.len(),
            collaborators.len()
        );

        // OWNERS only gates the roster; its content is never read.
        let owners_path = ctx.config.owners_path(ctx.sig);
        if self.fetch_gate(ctx, &owners_path).await.is_none() {
            return Ok(StrategyOutcome::Resolved(Owners::maintainers_only(baseline)));
        }

        let sig_info_path = ctx.config.sig_info_path(ctx.sig);
        let Some(content) = self.fetch_gate(ctx, &sig_info_path).await else {
            return Ok(StrategyOutcome::Resolved(Owners::maintainers_only(baseline)));
        };

        let raw = content
            .decode()
            .map_err(|e| ResolutionError::decode(ctx.repo, sig_info_path.as_str(), e))?;
        let roster = SigRoster::parse(&raw)
            .map_err(|e| ResolutionError::parse(ctx.repo, sig_info_path.as_str(), e))?;

        Ok(StrategyOutcome::Resolved(Owners::new(
            roster.maintainers,
            roster.committers,
        )))
    }
}
