//! Configuration handling for the CLI.
//!
//! This module turns CLI arguments and the bot configuration file into the
//! event to handle, and sets up GitHub authentication.

use crate::cli::{Args, GithubAuth};
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use secrecy::ExposeSecret;
use sig_welcome_core::{BotConfig, Configuration, WelcomeEvent};
use thiserror::Error;

const DEFAULT_GITHUB_BASE_URL: &str = "https://api.github.com/";

/// Errors that can occur during configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bot configuration file could not be loaded.
    #[error(transparent)]
    Load(#[from] sig_welcome_core::ConfigError),

    /// No configuration item applies to the repository.
    #[error("no configuration item applies to repository '{0}'")]
    NotConfigured(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// GitHub authentication error.
    #[error("GitHub authentication error: {0}")]
    GitHubAuth(String),
}

/// Application exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The event was handled.
    Success = 0,
    /// Application startup failed (wrong configuration or internal error).
    StartupFailure = 1,
    /// Application terminated by signal (SIGINT/SIGTERM).
    Terminated = 2,
    /// Handling the event failed.
    WelcomeFailed = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Validated and processed configuration for handling one event.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// The configuration item applying to the event's repository.
    pub bot_config: BotConfig,
    /// The event to handle.
    pub event: WelcomeEvent,
    /// Whether writes are only recorded.
    pub dry_run: bool,
    /// Whether to output JSON.
    pub json_output: bool,
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.author.trim().is_empty() {
            return Err(ConfigError::Invalid("author must not be empty".to_string()));
        }

        let configuration = Configuration::load(&args.config)?;
        let bot_config = configuration
            .config_for(&args.repository.org, &args.repository.repo)
            .cloned()
            .ok_or_else(|| ConfigError::NotConfigured(args.repository.to_string()))?;

        Ok(Self {
            bot_config,
            event: WelcomeEvent::new(args.repository.clone(), args.target(), args.author.trim()),
            dry_run: args.dry_run,
            json_output: args.json,
        })
    }
}

/// Creates an Octocrab client from CLI arguments.
///
/// Without credentials the client is anonymous and can only read public
/// repositories.
pub fn create_octocrab(args: &Args) -> Result<Octocrab, ConfigError> {
    let base_url = if args.github_base_url != DEFAULT_GITHUB_BASE_URL {
        Some(args.github_base_url.as_str())
    } else {
        None
    };

    let mut builder = Octocrab::builder();
    if let Some(url) = base_url {
        builder = builder
            .base_uri(url)
            .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
    }

    match args.github_auth() {
        GithubAuth::App {
            app_id,
            installation_id,
            private_key,
        } => {
            let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
                .map_err(|e| ConfigError::GitHubAuth(format!("invalid private key: {}", e)))?;

            let app_client = builder.app(AppId(app_id), key).build().map_err(|e| {
                ConfigError::GitHubAuth(format!("failed to create app client: {}", e))
            })?;

            app_client
                .installation(InstallationId(installation_id))
                .map_err(|e| {
                    ConfigError::GitHubAuth(format!("failed to get installation client: {}", e))
                })
        }
        GithubAuth::Token(token) => builder
            .personal_token(token.expose_secret().to_string())
            .build()
            .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e))),
        GithubAuth::Anonymous => builder
            .build()
            .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e))),
    }
}
