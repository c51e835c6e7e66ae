//! CLI module for the SIG welcome bot.
//!
//! This module provides command-line argument parsing using Clap with
//! environment variable support, so the bot can be driven by CI jobs or
//! webhook relays that export the event as variables.

pub mod config;
pub mod dry_run;
pub mod github;
pub mod output;

use clap::{Parser, ValueEnum};
use secrecy::SecretString;
use sig_welcome_core::hosting::{EventTarget, RepoId};
use std::path::PathBuf;

/// SIG welcome bot - greets new issues and merge requests.
///
/// Finds the SIG owning the repository, works out which maintainers and
/// committers to mention, posts a welcome comment and attaches the
/// `sig/<name>` label.
#[derive(Parser, Debug)]
#[command(name = "sig-welcome")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the bot configuration file.
    #[arg(long, env = "SIG_WELCOME_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Repository of the event in 'org/repo' format.
    #[arg(long, env = "SIG_WELCOME_REPOSITORY")]
    pub repository: RepoId,

    /// Whether the event is a new issue or a new merge request.
    #[arg(long, env = "SIG_WELCOME_KIND", default_value = "issue")]
    pub kind: EventKind,

    /// Issue or merge request number.
    #[arg(long, env = "SIG_WELCOME_NUMBER")]
    pub number: u64,

    /// Username of the person who opened the issue or merge request.
    #[arg(long, env = "SIG_WELCOME_AUTHOR")]
    pub author: String,

    /// GitHub personal access token.
    #[arg(long, env = "GITHUB_ACCESS_TOKEN")]
    pub github_access_token: Option<String>,

    /// GitHub base URL for API requests (for GitHub Enterprise).
    #[arg(long, env = "GITHUB_BASE_URL", default_value = "https://api.github.com/")]
    pub github_base_url: String,

    /// GitHub App ID for authentication (alternative to access token).
    #[arg(long, env = "GITHUB_APP_ID")]
    pub github_app_id: Option<u64>,

    /// GitHub App Installation ID (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_INSTALLATION_ID")]
    pub github_app_installation_id: Option<u64>,

    /// GitHub App private key in PEM format (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY")]
    pub github_app_private_key: Option<String>,

    /// Resolve and render the welcome without posting anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Output the result as JSON instead of human-readable format.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// The kind of event being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum EventKind {
    /// A newly opened issue.
    Issue,
    /// A newly opened merge (pull) request.
    MergeRequest,
}

/// How to authenticate against GitHub.
#[derive(Debug)]
pub enum GithubAuth {
    /// No credentials; only public data can be read.
    Anonymous,
    /// A personal access token.
    Token(SecretString),
    /// A GitHub App installation.
    App {
        /// The App ID.
        app_id: u64,
        /// The installation ID.
        installation_id: u64,
        /// The App's private key in PEM format.
        private_key: SecretString,
    },
}

impl Args {
    /// Returns the issue or merge request the event is about.
    pub fn target(&self) -> EventTarget {
        match self.kind {
            EventKind::Issue => EventTarget::Issue(self.number),
            EventKind::MergeRequest => EventTarget::MergeRequest(self.number),
        }
    }

    /// Returns the configured authentication, App credentials first.
    pub fn github_auth(&self) -> GithubAuth {
        match (
            self.github_app_id,
            self.github_app_installation_id,
            &self.github_app_private_key,
        ) {
            (Some(app_id), Some(installation_id), Some(key)) => GithubAuth::App {
                app_id,
                installation_id,
                private_key: SecretString::from(key.clone()),
            },
            _ => match &self.github_access_token {
                Some(token) => GithubAuth::Token(SecretString::from(token.clone())),
                None => GithubAuth::Anonymous,
            },
        }
    }
}
