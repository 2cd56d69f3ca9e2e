//! GitHub-backed collaborators using octocrab.
//!
//! [`OctocrabClient`] implements the resolver's `DirectoryService` on top of
//! the GitHub REST API, and [`GithubContents`] reads CODEOWNERS files through
//! the repository contents API.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use codeowners_resolver_core::fetch::{OwnershipFileSource, RepositoryRef, SourceError};
use codeowners_resolver_core::resolve::{
    DirectoryError, DirectoryService, MemberRecord, Page, PageCursor, TeamRecord, UserRecord,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A wrapper around `octocrab::Octocrab` that implements `DirectoryService`.
///
/// This wrapper is necessary due to Rust's orphan rules, which prevent
/// implementing external traits on external types.
#[derive(Clone)]
pub struct OctocrabClient(pub octocrab::Octocrab);

impl OctocrabClient {
    /// Creates a new OctocrabClient from an Octocrab instance.
    pub fn new(client: octocrab::Octocrab) -> Self {
        Self(client)
    }
}

impl std::ops::Deref for OctocrabClient {
    type Target = octocrab::Octocrab;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts the HTTP status code and message from an octocrab error.
fn extract_status(error: &octocrab::Error) -> Option<(StatusCode, &str)> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some((source.status_code, &source.message)),
        _ => None,
    }
}

/// Maps an octocrab error for a lookup of `subject`.
fn directory_error(error: octocrab::Error, subject: &str) -> DirectoryError {
    match extract_status(&error) {
        Some((StatusCode::NOT_FOUND, _)) => DirectoryError::NotFound(subject.to_string()),
        Some((StatusCode::TOO_MANY_REQUESTS, _)) => DirectoryError::RateLimitExceeded,
        Some((StatusCode::FORBIDDEN, message))
            if message.to_ascii_lowercase().contains("rate limit") =>
        {
            DirectoryError::RateLimitExceeded
        }
        Some((StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, message)) => {
            DirectoryError::Unauthorized(format!("{}: {}", subject, message))
        }
        Some(_) => DirectoryError::Api(error.to_string()),
        // No response status: the request failed in transit or the body did
        // not decode.
        None => DirectoryError::Other(error.to_string()),
    }
}

/// Query parameters of a paginated listing.
#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

impl PageParams {
    fn at(cursor: Option<PageCursor>, per_page: u8) -> Self {
        Self {
            per_page,
            page: cursor.unwrap_or(PageCursor::FIRST).page(),
        }
    }
}

/// Converts an octocrab page, whose `next` link GitHub sets from the
/// `Link` header, into a cursor-addressed page.
fn into_page<T, U: From<T>>(
    page: octocrab::Page<T>,
    cursor: Option<PageCursor>,
) -> Page<U> {
    let items = page.items.into_iter().map(U::from).collect();
    match page.next {
        Some(_) => Page::with_next(items, cursor.unwrap_or(PageCursor::FIRST).next()),
        None => Page::last(items),
    }
}

#[derive(Debug, Deserialize)]
struct OrganizationPayload {
    id: u64,
}

/// A team as returned by the teams endpoints. Listings omit the
/// organization; single-team lookups include it.
#[derive(Debug, Deserialize)]
struct TeamPayload {
    id: u64,
    slug: String,
    #[serde(default)]
    organization: Option<OrganizationPayload>,
}

impl From<TeamPayload> for TeamRecord {
    fn from(team: TeamPayload) -> Self {
        TeamRecord {
            id: team.id,
            slug: team.slug,
            organization_id: team.organization.map(|org| org.id),
        }
    }
}

#[async_trait]
impl DirectoryService for OctocrabClient {
    async fn get_user(&self, login: &str) -> Result<UserRecord, DirectoryError> {
        let route = format!("/users/{}", login);
        trace!("GET {}", route);
        self.0
            .get::<UserRecord, _, ()>(route, None)
            .await
            .map_err(|e| directory_error(e, &format!("user {}", login)))
    }

    async fn list_org_teams(
        &self,
        org: &str,
        cursor: Option<PageCursor>,
        per_page: u8,
    ) -> Result<Page<TeamRecord>, DirectoryError> {
        let route = format!("/orgs/{}/teams", org);
        let params = PageParams::at(cursor, per_page);
        trace!("GET {} page {}", route, params.page);
        let page = self
            .0
            .get::<octocrab::Page<TeamPayload>, _, _>(route, Some(&params))
            .await
            .map_err(|e| directory_error(e, &format!("organization {}", org)))?;
        Ok(into_page(page, cursor))
    }

    async fn get_team_by_slug(&self, org: &str, slug: &str) -> Result<TeamRecord, DirectoryError> {
        let route = format!("/orgs/{}/teams/{}", org, slug);
        trace!("GET {}", route);
        self.0
            .get::<TeamPayload, _, ()>(route, None)
            .await
            .map(TeamRecord::from)
            .map_err(|e| directory_error(e, &format!("team {}/{}", org, slug)))
    }

    async fn list_team_members(
        &self,
        org_id: u64,
        team_id: u64,
        cursor: Option<PageCursor>,
        per_page: u8,
    ) -> Result<Page<MemberRecord>, DirectoryError> {
        let route = format!("/organizations/{}/team/{}/members", org_id, team_id);
        let params = PageParams::at(cursor, per_page);
        trace!("GET {} page {}", route, params.page);
        let page = self
            .0
            .get::<octocrab::Page<MemberRecord>, _, _>(route, Some(&params))
            .await
            .map_err(|e| directory_error(e, &format!("members of team {}", team_id)))?;
        Ok(into_page(page, cursor))
    }
}

/// A file as returned by the repository contents endpoint.
#[derive(Debug, Deserialize)]
struct ContentPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Reads CODEOWNERS files from a GitHub repository's default branch.
pub struct GithubContents {
    client: octocrab::Octocrab,
    repository: RepositoryRef,
}

impl GithubContents {
    /// Creates a source reading from `repository`.
    pub fn new(client: octocrab::Octocrab, repository: RepositoryRef) -> Self {
        Self { client, repository }
    }

    fn decode(path: &str, payload: ContentPayload) -> Result<String, SourceError> {
        let read_error = |message: String| SourceError::Read {
            path: path.to_string(),
            message,
        };

        if payload.kind != "file" {
            return Err(read_error(format!("is a {}, not a file", payload.kind)));
        }

        let content = payload.content.unwrap_or_default();
        let bytes = match payload.encoding.as_deref() {
            Some("base64") => {
                // GitHub wraps the encoded content at 60 columns.
                let compact: String = content.split_whitespace().collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| read_error(format!("invalid base64 content: {}", e)))?
            }
            Some("") | None => content.into_bytes(),
            Some(other) => return Err(read_error(format!("unsupported encoding {}", other))),
        };

        String::from_utf8(bytes).map_err(|e| read_error(format!("not UTF-8: {}", e)))
    }
}

#[async_trait]
impl OwnershipFileSource for GithubContents {
    fn describe(&self) -> String {
        format!("GitHub repository {}", self.repository)
    }

    async fn read(&self, path: &str) -> Result<String, SourceError> {
        let route = format!(
            "/repos/{}/{}/contents/{}",
            self.repository.owner, self.repository.repo, path
        );
        trace!("GET {}", route);

        match self.client.get::<ContentPayload, _, ()>(route, None).await {
            Ok(payload) => Self::decode(path, payload),
            Err(e) => Err(match extract_status(&e) {
                Some((StatusCode::NOT_FOUND, _)) => SourceError::NotFound(path.to_string()),
                Some((StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, message)) => {
                    SourceError::Unauthorized {
                        path: path.to_string(),
                        message: message.to_string(),
                    }
                }
                _ => SourceError::Read {
                    path: path.to_string(),
                    message: e.to_string(),
                },
            }),
        }
    }
}
