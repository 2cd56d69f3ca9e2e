//! Configuration handling for the CLI.
//!
//! This module converts CLI arguments into the library's configuration types
//! and handles GitHub authentication setup.

use crate::cli::Args;
use codeowners_resolver_core::{RepositoryRef, ResolverConfig};
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// Errors that can occur during configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration.
    #[error("missing required configuration: {0}")]
    MissingRequired(String),

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
    /// Every path resolved to at least one owner.
    Success = 0,
    /// Application startup failed (wrong configuration, authentication or
    /// CODEOWNERS retrieval).
    StartupFailure = 1,
    /// Application terminated by signal (SIGINT/SIGTERM) or timeout.
    Terminated = 2,
    /// At least one path has no resolved owner.
    ResolutionFailed = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Where to read the CODEOWNERS file from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLocation {
    /// A local checkout.
    Local(PathBuf),
    /// A repository on GitHub.
    Github(RepositoryRef),
}

/// What the run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Match paths and resolve their owners.
    Resolve,
    /// Match paths and print the owner specifiers.
    MatchOnly,
    /// Print the normalized rule table.
    Render,
}

/// GitHub credentials.
#[derive(Debug)]
pub enum GithubAuth {
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

/// Validated and processed configuration for running the resolver.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Where the CODEOWNERS file lives.
    pub location: FileLocation,
    /// Paths to find owners for.
    pub paths: Vec<String>,
    /// What to produce.
    pub mode: Mode,
    /// GitHub credentials, if the run needs the API.
    pub auth: Option<GithubAuth>,
    /// GitHub API base URL, if not the public API.
    pub base_url: Option<String>,
    /// How long resolution may run.
    pub timeout: Option<Duration>,
    /// Configuration for the resolver.
    pub resolver_config: ResolverConfig,
    /// Whether to output JSON.
    pub json_output: bool,
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let location = match args.repository {
            Some(ref repository) => FileLocation::Github(
                repository
                    .parse()
                    .map_err(|e| ConfigError::Invalid(format!("{}", e)))?,
            ),
            None => {
                let repo_path = args.repository_path.canonicalize().map_err(|e| {
                    ConfigError::Invalid(format!(
                        "repository path '{}' is invalid: {}",
                        args.repository_path.display(),
                        e
                    ))
                })?;
                FileLocation::Local(repo_path)
            }
        };

        let mode = if args.render {
            Mode::Render
        } else if args.match_only {
            Mode::MatchOnly
        } else {
            Mode::Resolve
        };

        if args.has_partial_github_app_auth() {
            return Err(ConfigError::MissingRequired(
                "GITHUB_APP_ID, GITHUB_APP_INSTALLATION_ID and GITHUB_APP_PRIVATE_KEY must all be set for GitHub App authentication".to_string(),
            ));
        }

        let auth = if args.needs_github() {
            Some(github_auth(args).ok_or_else(|| {
                ConfigError::MissingRequired(
                    "GITHUB_ACCESS_TOKEN or GitHub App credentials are required to use the GitHub API"
                        .to_string(),
                )
            })?)
        } else {
            None
        };

        let timeout = match args.timeout {
            Some(0) => {
                return Err(ConfigError::Invalid(
                    "timeout must be at least one second".to_string(),
                ));
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        if args.max_in_flight == Some(0) {
            return Err(ConfigError::Invalid(
                "max-in-flight must be at least 1".to_string(),
            ));
        }
        let resolver_config = ResolverConfig::new().with_max_in_flight(args.max_in_flight);

        let base_url = if args.github_base_url != DEFAULT_BASE_URL {
            Some(args.github_base_url.clone())
        } else {
            None
        };

        Ok(Self {
            location,
            paths: args.paths.clone(),
            mode,
            auth,
            base_url,
            timeout,
            resolver_config,
            json_output: args.json,
        })
    }

    /// Determines the exit code from whether every path got an owner.
    pub fn exit_code_for_results(&self, all_resolved: bool) -> ExitCode {
        if all_resolved {
            ExitCode::Success
        } else {
            ExitCode::ResolutionFailed
        }
    }
}

/// Picks GitHub App credentials over a personal token when both are set.
fn github_auth(args: &Args) -> Option<GithubAuth> {
    match (
        args.github_app_id,
        args.github_app_installation_id,
        &args.github_app_private_key,
    ) {
        (Some(app_id), Some(installation_id), Some(private_key)) => Some(GithubAuth::App {
            app_id,
            installation_id,
            private_key: SecretString::from(private_key.clone()),
        }),
        _ => args
            .github_access_token
            .as_ref()
            .map(|token| GithubAuth::Token(SecretString::from(token.clone()))),
    }
}

/// Creates an authenticated Octocrab client from the validated configuration.
///
/// Returns `None` if the run does not need the GitHub API.
pub async fn create_octocrab(config: &ValidatedConfig) -> Result<Option<Octocrab>, ConfigError> {
    let Some(ref auth) = config.auth else {
        return Ok(None);
    };

    let base_url = config.base_url.as_deref();

    match auth {
        GithubAuth::App {
            app_id,
            installation_id,
            private_key,
        } => {
            let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
                .map_err(|e| ConfigError::GitHubAuth(format!("invalid private key: {}", e)))?;

            let mut app_builder = Octocrab::builder().app(AppId(*app_id), key);
            if let Some(url) = base_url {
                app_builder = app_builder
                    .base_uri(url)
                    .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
            }
            let app_client = app_builder.build().map_err(|e| {
                ConfigError::GitHubAuth(format!("failed to create app client: {}", e))
            })?;

            let client = app_client
                .installation(InstallationId(*installation_id))
                .map_err(|e| {
                    ConfigError::GitHubAuth(format!("failed to get installation client: {}", e))
                })?;

            Ok(Some(client))
        }
        GithubAuth::Token(token) => {
            let mut builder = Octocrab::builder();
            if let Some(url) = base_url {
                builder = builder
                    .base_uri(url)
                    .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
            }
            let client = builder
                .personal_token(token.expose_secret().to_string())
                .build()
                .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e)))?;

            Ok(Some(client))
        }
    }
}
