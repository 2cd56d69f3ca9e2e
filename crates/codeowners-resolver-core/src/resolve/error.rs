//! Error types for owner resolution.

use super::directory::DirectoryError;
use crate::matching::MatchError;
use crate::owners::{EmailParseError, UnrecognizedSpecifier};
use thiserror::Error;

/// An error from one branch of a resolution.
///
/// Resolution is fail-open: each of these is scoped to the specifier (or
/// team member) that produced it and never stops sibling branches.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The matched rule named no owners.
    #[error("failed to find owner: rule has no owners")]
    NoOwners,

    /// No rule applies to the path.
    #[error(transparent)]
    NoMatch(#[from] MatchError),

    /// The owner token is neither a team, a user, nor an email address.
    #[error(transparent)]
    UnrecognizedSpecifier(#[from] UnrecognizedSpecifier),

    /// An email owner is not a valid mail address.
    #[error(transparent)]
    EmailParse(#[from] EmailParseError),

    /// A directory service call failed.
    #[error("failed to look up {subject}: {source}")]
    DirectoryLookupFailed {
        /// What was being looked up (e.g. `@octocat`).
        subject: String,
        /// The underlying directory error.
        #[source]
        source: DirectoryError,
    },

    /// No team with the slug exists in the organization.
    #[error("failed to find team matching {slug} in organization {org}")]
    TeamNotFound {
        /// The organization login.
        org: String,
        /// The team slug.
        slug: String,
    },

    /// The team's owning organization could not be determined.
    #[error("failed to find organization for team {org}/{slug}")]
    OrganizationResolutionFailed {
        /// The organization login.
        org: String,
        /// The team slug.
        slug: String,
        /// The failed slug lookup, if the lookup itself failed.
        #[source]
        source: Option<DirectoryError>,
    },
}

impl ResolveError {
    /// Creates a directory lookup error for `subject`.
    pub fn lookup_failed(subject: impl Into<String>, source: DirectoryError) -> Self {
        Self::DirectoryLookupFailed {
            subject: subject.into(),
            source,
        }
    }

    /// Returns a short machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NoOwners => "no_owners",
            ResolveError::NoMatch(_) => "no_match",
            ResolveError::UnrecognizedSpecifier(_) => "unrecognized_specifier",
            ResolveError::EmailParse(_) => "email_parse",
            ResolveError::DirectoryLookupFailed { .. } => "directory_lookup_failed",
            ResolveError::TeamNotFound { .. } => "team_not_found",
            ResolveError::OrganizationResolutionFailed { .. } => {
                "organization_resolution_failed"
            }
        }
    }
}
