//! Owners of the changed files, per the relation document.

use super::{OwnerStrategy, Owners, ResolutionContext, ResolutionError, StrategyOutcome};
use crate::documents::RelationDocument;
use async_trait::async_trait;
use log::debug;

/// Attributes a merge request's changed files to owners through the
/// relation document.
///
/// Only runs for merge requests when simplified welcome is enabled. The
/// owners found are all reported as maintainers; this strategy never names
/// committers. Any failure is recoverable.
#[derive(Debug, Clone, Default)]
pub struct PathTargetedStrategy;

impl PathTargetedStrategy {
    /// Creates a new path-targeted strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OwnerStrategy for PathTargetedStrategy {
    fn name(&self) -> &'static str {
        "path-targeted"
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext<'_>,
    ) -> Result<StrategyOutcome, ResolutionError> {
        if !ctx.config.simplified_welcome_enabled {
            return Ok(StrategyOutcome::Skipped(
                "simplified welcome is disabled".to_string(),
            ));
        }
        let Some(number) = ctx.target.merge_request() else {
            return Ok(StrategyOutcome::Skipped("not a merge request".to_string()));
        };

        let changed = ctx
            .reader
            .fetch_changed_paths(ctx.repo, number)
            .await
            .map_err(|e| ResolutionError::fetch(ctx.repo, "changed paths", e))?;
        if changed.is_empty() {
            return Ok(StrategyOutcome::Skipped("no changed paths".to_string()));
        }
        debug!("Merge request !{} changes {} path(s)", number, changed.len());

        let path = &ctx.config.relation_file_path;
        let content = ctx
            .reader
            .fetch_path_content(ctx.repo, path, &ctx.config.relation_file_branch)
            .await
            .map_err(|e| ResolutionError::fetch(ctx.repo, path.as_str(), e))?;
        if content.is_empty() {
            return Ok(StrategyOutcome::Skipped(format!("{} is empty", path)));
        }

        let raw = content
            .decode()
            .map_err(|e| ResolutionError::decode(ctx.repo, path.as_str(), e))?;
        let document = RelationDocument::parse(&raw)
            .map_err(|e| ResolutionError::parse(ctx.repo, path.as_str(), e))?;
        let owners = document
            .owners_for(&changed)
            .map_err(|e| ResolutionError::parse(ctx.repo, path.as_str(), e))?;

        if owners.is_empty() {
            return Ok(StrategyOutcome::Skipped(
                "no relation rule matches the changed paths".to_string(),
            ));
        }
        Ok(StrategyOutcome::Resolved(Owners::maintainers_only(owners)))
    }
}
