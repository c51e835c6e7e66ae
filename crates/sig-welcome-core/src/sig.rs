//! Locating the SIG that owns a repository.
//!
//! The community repository lists every managed repository under the SIG
//! owning it, as `sig/<sig>/<org>/<repo>.yaml` or, for large organizations,
//! `sig/<sig>/<org>/<shard>/<repo>.yaml`.

use crate::config::BotConfig;
use crate::hosting::{RepoId, RepositoryReader};
use crate::resolve::ResolutionError;
use log::{debug, info};

/// Returns the label attached for a SIG.
pub fn sig_label(sig: &str) -> String {
    format!("sig/{}", sig)
}

/// Finds the SIG listing `repo` among the given tree paths.
pub fn sig_from_tree<I, S>(paths: I, repo: &RepoId) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let file_name = format!("{}.yaml", repo.repo);
    paths.into_iter().find_map(|path| {
        let segments: Vec<&str> = path.as_ref().split('/').collect();
        match segments.as_slice() {
            ["sig", sig, org, file] | ["sig", sig, org, _, file]
                if !sig.is_empty() && *org == repo.org && *file == file_name =>
            {
                Some(sig.to_string())
            }
            _ => None,
        }
    })
}

/// Looks up the SIG owning `repo`.
///
/// A SIG pinned in the configuration wins. Otherwise the community
/// repository's tree is scanned at the SIG branch.
pub async fn locate_sig(
    reader: &dyn RepositoryReader,
    repo: &RepoId,
    config: &BotConfig,
) -> Result<String, ResolutionError> {
    if let Some(sig) = config.sig.as_deref().filter(|s| !s.trim().is_empty()) {
        debug!("Using configured SIG '{}' for {}", sig, repo);
        return Ok(sig.to_string());
    }

    let community = config.community_repo.as_ref().unwrap_or(repo);
    let tree = reader
        .fetch_tree(community, &config.sig_info_branch)
        .await
        .map_err(|e| ResolutionError::fetch(community, "repository tree", e))?;
    debug!("Scanning {} tree entries of {} for {}", tree.len(), community, repo);

    match sig_from_tree(&tree, repo) {
        Some(sig) => {
            info!("Repository {} belongs to SIG '{}'", repo, sig);
            Ok(sig)
        }
        None => Err(ResolutionError::SigNotFound { repo: repo.clone() }),
    }
}
