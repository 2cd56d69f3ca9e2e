//! CLI module for the CODEOWNERS resolver.
//!
//! Command-line argument parsing using Clap, with environment variable
//! fallbacks for everything a CI job would normally inject.

pub mod config;
pub mod github;
pub mod output;

use clap::Parser;
use std::path::PathBuf;

/// CODEOWNERS resolver - finds who owns files in a repository.
///
/// Matches each path against the repository's CODEOWNERS file and expands
/// the matching owners (users, teams and email addresses) into concrete
/// identities using the GitHub API.
#[derive(Parser, Debug)]
#[command(name = "codeowners-resolver")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Repository-relative paths to find owners for.
    #[arg(required_unless_present = "render")]
    pub paths: Vec<String>,

    /// Path to a local checkout to read the CODEOWNERS file from.
    #[arg(long, env = "REPOSITORY_PATH", default_value = ".")]
    pub repository_path: PathBuf,

    /// Repository in 'owner/repo' format to fetch the CODEOWNERS file from.
    /// Takes precedence over --repository-path.
    #[arg(long, env = "RESOLVER_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub personal access token.
    #[arg(long, env = "GITHUB_ACCESS_TOKEN", hide_env_values = true)]
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
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY", hide_env_values = true)]
    pub github_app_private_key: Option<String>,

    /// Give up on resolution after this many seconds.
    #[arg(long, env = "RESOLVE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of concurrent GitHub API calls (unbounded by default).
    #[arg(long, env = "RESOLVE_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Print the matching owner specifiers without resolving them.
    #[arg(long)]
    pub match_only: bool,

    /// Print the normalized CODEOWNERS rules and exit.
    #[arg(long)]
    pub render: bool,

    /// Output results as JSON instead of human-readable format.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Returns true if GitHub authentication is configured.
    pub fn has_github_auth(&self) -> bool {
        self.github_access_token.is_some() || self.has_github_app_auth()
    }

    /// Returns true if GitHub App authentication is configured.
    pub fn has_github_app_auth(&self) -> bool {
        self.github_app_id.is_some()
            && self.github_app_installation_id.is_some()
            && self.github_app_private_key.is_some()
    }

    /// Returns true if only some of the GitHub App options are set.
    pub fn has_partial_github_app_auth(&self) -> bool {
        let set = [
            self.github_app_id.is_some(),
            self.github_app_installation_id.is_some(),
            self.github_app_private_key.is_some(),
        ];
        set.iter().any(|&s| s) && !set.iter().all(|&s| s)
    }

    /// Returns true if the run needs the GitHub API.
    pub fn needs_github(&self) -> bool {
        self.repository.is_some() || !(self.match_only || self.render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_positional() {
        let args = Args::parse_from(["codeowners-resolver", "src/main.rs", "docs/readme.md"]);
        assert_eq!(args.paths, vec!["src/main.rs", "docs/readme.md"]);
    }

    #[test]
    fn test_paths_required_without_render() {
        assert!(Args::try_parse_from(["codeowners-resolver"]).is_err());
        let args = Args::parse_from(["codeowners-resolver", "--render"]);
        assert!(args.paths.is_empty());
    }

    #[test]
    fn test_json_output_flag() {
        let args = Args::parse_from(["codeowners-resolver", "--json", "a"]);
        assert!(args.json);

        let args = Args::parse_from(["codeowners-resolver", "-j", "a"]);
        assert!(args.json);
    }

    #[test]
    fn test_verbose_flag() {
        let args = Args::parse_from(["codeowners-resolver", "a"]);
        assert_eq!(args.verbose, 0);

        let args = Args::parse_from(["codeowners-resolver", "-vv", "a"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["codeowners-resolver", "a"]);
        assert_eq!(args.repository_path, PathBuf::from("."));
        assert_eq!(args.github_base_url, "https://api.github.com/");
        assert_eq!(args.timeout, None);
        assert_eq!(args.max_in_flight, None);
        assert!(!args.match_only);
    }

    #[test]
    fn test_resolution_options() {
        let args = Args::parse_from([
            "codeowners-resolver",
            "--timeout",
            "30",
            "--max-in-flight",
            "8",
            "a",
        ]);
        assert_eq!(args.timeout, Some(30));
        assert_eq!(args.max_in_flight, Some(8));
    }

    #[test]
    fn test_github_auth_detection() {
        let args = Args::parse_from(["codeowners-resolver", "a"]);
        assert!(!args.has_github_auth());

        let args = Args::parse_from([
            "codeowners-resolver",
            "--github-access-token",
            "ghp_test",
            "a",
        ]);
        assert!(args.has_github_auth());
        assert!(!args.has_github_app_auth());
    }

    #[test]
    fn test_partial_app_auth() {
        let args = Args::parse_from(["codeowners-resolver", "--github-app-id", "1", "a"]);
        assert!(args.has_partial_github_app_auth());
        assert!(!args.has_github_auth());
    }

    #[test]
    fn test_needs_github() {
        let args = Args::parse_from(["codeowners-resolver", "a"]);
        assert!(args.needs_github());

        let args = Args::parse_from(["codeowners-resolver", "--match-only", "a"]);
        assert!(!args.needs_github());

        let args = Args::parse_from([
            "codeowners-resolver",
            "--match-only",
            "--repository",
            "octo/repo",
            "a",
        ]);
        assert!(args.needs_github());
    }
}
