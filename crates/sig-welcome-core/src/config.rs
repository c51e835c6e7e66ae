//! Bot configuration.
//!
//! The configuration file lists items, each applying to a set of
//! organizations or repositories:
//!
//! ```yaml
//! config_items:
//!   - repos: ["openeuler", "src-openeuler/kernel"]
//!     excluded_repos: ["openeuler/private"]
//!     community_name: openEuler
//!     command_link: https://example.org/commands
//!     welcome_simpler: true
//!     file_path: relations.yaml
//!     file_branch: master
//! ```
//!
//! An item naming `org/repo` takes precedence over one naming just `org`.

use crate::hosting::RepoId;
use crate::resolve::{ResolutionConfig, SIG_PLACEHOLDER};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the schema.
    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A config item has an invalid value.
    #[error("config item {index}: {message}")]
    Invalid {
        /// Position of the item in `config_items` (0-based).
        index: usize,
        /// What is wrong.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid-item error.
    pub fn invalid(index: usize, message: impl Into<String>) -> Self {
        Self::Invalid {
            index,
            message: message.into(),
        }
    }
}

/// Settings applying to a set of repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Organizations (`org`) or repositories (`org/repo`) this item covers.
    pub repos: Vec<String>,
    /// Repositories (`org/repo`) excluded from an organization-wide item.
    pub excluded_repos: Vec<String>,
    /// Community name used in the welcome comment.
    pub community_name: String,
    /// Link to the bot command instructions.
    pub command_link: String,
    /// Base URL of the per-SIG pages, the SIG name is appended.
    pub sig_link_base: String,
    /// Enables path-targeted owner resolution for merge requests.
    pub welcome_simpler: bool,
    /// Relation document path.
    pub file_path: String,
    /// Relation document branch.
    pub file_branch: String,
    /// Branch holding the SIG files.
    pub sig_info_branch: String,
    /// Path of a SIG's `OWNERS` marker.
    pub owners_path_template: String,
    /// Path of a SIG's roster.
    pub sig_info_path_template: String,
    /// Repository whose tree maps repositories to SIGs; defaults to the
    /// repository of the event.
    pub community_repo: Option<RepoId>,
    /// Pins the SIG instead of looking it up.
    pub sig: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        let resolution = ResolutionConfig::default();
        Self {
            repos: Vec::new(),
            excluded_repos: Vec::new(),
            community_name: String::new(),
            command_link: String::new(),
            sig_link_base: "https://gitee.com/openeuler/community/tree/master/sig".to_string(),
            welcome_simpler: false,
            file_path: String::new(),
            file_branch: String::new(),
            sig_info_branch: resolution.sig_info_branch,
            owners_path_template: resolution.owners_path_template,
            sig_info_path_template: resolution.sig_info_path_template,
            community_repo: None,
            sig: None,
        }
    }
}

impl BotConfig {
    /// Returns the settings used by owner resolution.
    pub fn resolution_config(&self) -> ResolutionConfig {
        ResolutionConfig {
            simplified_welcome_enabled: self.welcome_simpler,
            relation_file_path: self.file_path.clone(),
            relation_file_branch: self.file_branch.clone(),
            owners_path_template: self.owners_path_template.clone(),
            sig_info_path_template: self.sig_info_path_template.clone(),
            sig_info_branch: self.sig_info_branch.clone(),
        }
    }

    /// Checks the item for missing or inconsistent values.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.repos.is_empty() {
            return Err(ConfigError::invalid(index, "repos must not be empty"));
        }
        if self.community_name.trim().is_empty() {
            return Err(ConfigError::invalid(index, "community_name is required"));
        }
        if self.sig_info_branch.trim().is_empty() {
            return Err(ConfigError::invalid(index, "sig_info_branch must not be empty"));
        }
        for (name, template) in [
            ("owners_path_template", &self.owners_path_template),
            ("sig_info_path_template", &self.sig_info_path_template),
        ] {
            if !template.contains(SIG_PLACEHOLDER) {
                return Err(ConfigError::invalid(
                    index,
                    format!("{} must contain {}", name, SIG_PLACEHOLDER),
                ));
            }
        }
        if self.welcome_simpler && (self.file_path.is_empty() || self.file_branch.is_empty()) {
            return Err(ConfigError::invalid(
                index,
                "welcome_simpler requires file_path and file_branch",
            ));
        }
        if matches!(&self.sig, Some(sig) if sig.trim().is_empty()) {
            return Err(ConfigError::invalid(index, "sig must not be blank"));
        }
        Ok(())
    }

    fn excludes(&self, full_name: &str) -> bool {
        self.excluded_repos.iter().any(|r| r == full_name)
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Configuration items, in file order.
    #[serde(default)]
    pub config_items: Vec<BotConfig>,
}

impl Configuration {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a configuration document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every item.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config_items
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| item.validate(index))
    }

    /// Returns the item that applies to `org/repo`, if any.
    pub fn config_for(&self, org: &str, repo: &str) -> Option<&BotConfig> {
        let full_name = format!("{}/{}", org, repo);
        let mut org_match = None;

        for item in &self.config_items {
            if item.excludes(&full_name) {
                continue;
            }
            if item.repos.iter().any(|r| *r == full_name) {
                debug!("Using repository-level config for {}", full_name);
                return Some(item);
            }
            if org_match.is_none() && item.repos.iter().any(|r| r == org) {
                org_match = Some(item);
            }
        }

        if org_match.is_some() {
            debug!("Using organization-level config for {}", full_name);
        }
        org_match
    }
}
