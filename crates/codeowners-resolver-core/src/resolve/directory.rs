//! Directory service trait abstraction for owner resolution.
//!
//! The resolution engine looks users, teams and team members up through
//! [`DirectoryService`], so the GitHub REST client, a Python bridge or a
//! test double can all sit behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque position in a paginated listing.
///
/// Wraps the 1-based page number used by the GitHub REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor(pub u32);

impl PageCursor {
    /// The first page of a listing.
    pub const FIRST: PageCursor = PageCursor(1);

    /// Returns the page number.
    pub fn page(self) -> u32 {
        self.0
    }

    /// Returns the cursor of the following page.
    pub fn next(self) -> PageCursor {
        PageCursor(self.0.saturating_add(1))
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.0)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Where the next page starts, or `None` if this is the last page.
    pub next: Option<PageCursor>,
}

impl<T> Page<T> {
    /// Creates the last page of a listing.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Creates a page that is followed by `next`.
    pub fn with_next(items: Vec<T>, next: PageCursor) -> Self {
        Self {
            items,
            next: Some(next),
        }
    }
}

/// A user as returned by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// The user's login.
    pub login: String,
    /// The user's numeric identifier.
    pub id: u64,
    /// The user's public email address, if any.
    #[serde(default)]
    pub email: Option<String>,
}

/// A team as returned by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// The team's numeric identifier.
    pub id: u64,
    /// The team's slug.
    pub slug: String,
    /// The numeric identifier of the owning organization, when the listing
    /// carries it.
    #[serde(default)]
    pub organization_id: Option<u64>,
}

/// A team member as returned by a membership listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// The member's login.
    pub login: String,
}

/// Errors that can occur when talking to the directory service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The requested user, team or organization does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Insufficient authorization for the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// An API error occurred.
    #[error("API error: {0}")]
    Api(String),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Trait for directory service implementations.
///
/// Implementations must tolerate concurrent calls: the resolution engine
/// shares one handle between all of its tasks.
///
/// # Example
///
/// ```rust,ignore
/// use codeowners_resolver_core::resolve::{DirectoryService, DirectoryError, UserRecord};
///
/// struct MyDirectory { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl DirectoryService for MyDirectory {
///     async fn get_user(&self, login: &str) -> Result<UserRecord, DirectoryError> {
///         // Look the user up via your preferred method
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Fetches a user by login (without the leading '@').
    async fn get_user(&self, login: &str) -> Result<UserRecord, DirectoryError>;

    /// Lists one page of an organization's teams.
    ///
    /// `cursor` is `None` for the first page.
    async fn list_org_teams(
        &self,
        org: &str,
        cursor: Option<PageCursor>,
        per_page: u8,
    ) -> Result<Page<TeamRecord>, DirectoryError>;

    /// Fetches a team by its slug.
    async fn get_team_by_slug(&self, org: &str, slug: &str) -> Result<TeamRecord, DirectoryError>;

    /// Lists one page of a team's members.
    ///
    /// `cursor` is `None` for the first page.
    async fn list_team_members(
        &self,
        org_id: u64,
        team_id: u64,
        cursor: Option<PageCursor>,
        per_page: u8,
    ) -> Result<Page<MemberRecord>, DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_cursor_advances() {
        assert_eq!(PageCursor::FIRST.page(), 1);
        assert_eq!(PageCursor::FIRST.next(), PageCursor(2));
        assert_eq!(PageCursor(u32::MAX).next(), PageCursor(u32::MAX));
        assert_eq!(PageCursor(3).to_string(), "page 3");
    }

    #[test]
    fn page_constructors() {
        let last: Page<u8> = Page::last(vec![1, 2]);
        assert_eq!(last.next, None);

        let more = Page::with_next(vec![1u8], PageCursor(2));
        assert_eq!(more.next, Some(PageCursor(2)));
    }

    #[test]
    fn directory_error_display() {
        let err = DirectoryError::Api("test error".to_string());
        assert!(err.to_string().contains("test error"));
        assert_eq!(
            DirectoryError::RateLimitExceeded.to_string(),
            "rate limit exceeded"
        );
    }
}
