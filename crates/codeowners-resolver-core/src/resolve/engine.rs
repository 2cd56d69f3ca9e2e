//! Concurrent expansion of owner specifiers into identities.
//!
//! Each specifier is expanded by its own tokio task. Team expansion pages
//! through the organization's teams and then the team's members, spawning
//! one user-expansion task per member. Tasks report identities and errors
//! over an unbounded channel, so delivery never waits on the collector.
//!
//! Every task runs under a cancellation token owned by the call. When the
//! caller cancels, the call cancels that token, waits for its tasks to wind
//! down and returns what was collected; no task outlives the call.

use super::directory::{DirectoryService, MemberRecord, TeamRecord};
use super::error::ResolveError;
use super::outcome::{Identity, ResolutionOutcome};
use super::pagination::Paginator;
use crate::owners::{OwnerSpecifier, parse_address};
use crate::parse::OwnershipTable;
use futures::{FutureExt, TryStreamExt};
use log::{debug, info, trace, warn};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Page size the GitHub REST API allows at most.
const MAX_PAGE_SIZE: u8 = 100;

/// Configuration options for the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Page size requested when listing an organization's teams.
    pub team_page_size: u8,
    /// Page size requested when listing a team's members.
    pub member_page_size: u8,
    /// Upper bound on concurrent directory calls. `None` means unbounded.
    pub max_in_flight: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            team_page_size: MAX_PAGE_SIZE,
            member_page_size: MAX_PAGE_SIZE,
            max_in_flight: None,
        }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size for team listings.
    pub fn with_team_page_size(mut self, value: u8) -> Self {
        self.team_page_size = value.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Sets the page size for membership listings.
    pub fn with_member_page_size(mut self, value: u8) -> Self {
        self.member_page_size = value.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Bounds the number of concurrent directory calls.
    pub fn with_max_in_flight(mut self, value: Option<usize>) -> Self {
        self.max_in_flight = value.filter(|&n| n > 0);
        self
    }
}

/// Resolves owner specifiers into identities through a directory service.
///
/// The resolver holds no per-call state; one instance can serve any number
/// of concurrent [`resolve`](Resolver::resolve) calls.
#[derive(Clone)]
pub struct Resolver {
    directory: Arc<dyn DirectoryService>,
    config: ResolverConfig,
}

impl Resolver {
    /// Creates a resolver with default configuration.
    pub fn new(directory: Arc<dyn DirectoryService>) -> Self {
        Self::with_config(directory, ResolverConfig::default())
    }

    /// Creates a resolver with the given configuration.
    pub fn with_config(directory: Arc<dyn DirectoryService>, config: ResolverConfig) -> Self {
        Self { directory, config }
    }

    /// Returns the resolver's configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Expands owner tokens into identities.
    ///
    /// Returns once every spawned task has finished, or as soon as `cancel`
    /// fires. Either way the outcome holds whatever identities and errors were
    /// collected; a failing token never stops the others.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        specifiers: &[S],
        cancel: &CancellationToken,
    ) -> ResolutionOutcome {
        if specifiers.is_empty() {
            warn!("Matched rule has no owners");
            return ResolutionOutcome::failed(ResolveError::NoOwners);
        }

        let mut outcome = ResolutionOutcome::default();
        let scope = cancel.child_token();
        let tracker = TaskTracker::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let spawned = Arc::new(AtomicUsize::new(0));

        let expansion = Expansion {
            directory: Arc::clone(&self.directory),
            config: self.config,
            permits: self
                .config
                .max_in_flight
                .map(|limit| Arc::new(Semaphore::new(limit))),
            tracker: tracker.clone(),
            scope: scope.clone(),
            tx,
            spawned: Arc::clone(&spawned),
        };

        for token in specifiers {
            let token = token.as_ref();
            match OwnerSpecifier::classify(token) {
                Ok(specifier) => expansion.spawn(specifier),
                Err(e) => {
                    warn!("{}", e);
                    outcome.errors.push(e.into());
                }
            }
        }

        // The channel closes once the last task drops its sender.
        drop(expansion);
        tracker.close();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Resolution cancelled, stopping outstanding expansions");
                    scope.cancel();
                    outcome.cancelled = true;
                    break;
                }
                delivery = rx.recv() => match delivery {
                    Some(delivery) => outcome.record(delivery),
                    None => break,
                },
            }
        }

        tracker.wait().await;
        // Deliveries that landed while the tasks were winding down.
        while let Ok(delivery) = rx.try_recv() {
            outcome.record(delivery);
        }

        outcome.tasks = spawned.load(Ordering::SeqCst);
        debug!(
            "Resolution complete: {} identities, {} errors, {} tasks",
            outcome.identities.len(),
            outcome.errors.len(),
            outcome.tasks
        );
        outcome
    }

    /// Finds the rule for `path` and resolves its owners.
    ///
    /// If no rule applies, the outcome holds that as its only error.
    pub async fn resolve_path(
        &self,
        table: &OwnershipTable,
        path: &str,
        cancel: &CancellationToken,
    ) -> ResolutionOutcome {
        match table.match_path(path) {
            Ok(specifiers) => self.resolve(specifiers, cancel).await,
            Err(e) => ResolutionOutcome::failed(e.into()),
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("directory", &"<dyn DirectoryService>")
            .field("config", &self.config)
            .finish()
    }
}

enum Delivery {
    Identity(Identity),
    Error(ResolveError),
}

impl ResolutionOutcome {
    fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Identity(identity) => self.identities.push(identity),
            Delivery::Error(error) => self.errors.push(error),
        }
    }
}

/// Per-call state shared by every task of one resolution.
#[derive(Clone)]
struct Expansion {
    directory: Arc<dyn DirectoryService>,
    config: ResolverConfig,
    permits: Option<Arc<Semaphore>>,
    tracker: TaskTracker,
    scope: CancellationToken,
    tx: mpsc::UnboundedSender<Delivery>,
    spawned: Arc<AtomicUsize>,
}

impl Expansion {
    /// Spawns a task expanding `specifier`.
    fn spawn(&self, specifier: OwnerSpecifier) {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        let this = self.clone();
        self.tracker.spawn(async move {
            let label = specifier.to_string();
            tokio::select! {
                biased;
                _ = this.scope.cancelled() => trace!("Expansion of {} cancelled", label),
                _ = this.expand(specifier) => trace!("Expansion of {} finished", label),
            }
        });
    }

    async fn expand(&self, specifier: OwnerSpecifier) {
        debug!("Expanding {} owner {}", specifier.kind(), specifier);

        let result = match specifier {
            OwnerSpecifier::Email { address } => self.expand_email(&address).map(Some),
            OwnerSpecifier::User { login } => self.expand_user(&login).await.map(Some),
            OwnerSpecifier::Team { org, slug } => {
                self.expand_team(&org, &slug).await.map(|()| None)
            }
        };

        match result {
            Ok(Some(identity)) => self.deliver(Delivery::Identity(identity)),
            Ok(None) => {}
            Err(e) => {
                warn!("{}", e);
                self.deliver(Delivery::Error(e));
            }
        }
    }

    fn deliver(&self, delivery: Delivery) {
        if self.tx.send(delivery).is_err() {
            trace!("Collector is gone, dropping delivery");
        }
    }

    /// Waits for a directory call slot when concurrency is bounded.
    async fn permit(&self) -> Option<OwnedSemaphorePermit> {
        match &self.permits {
            Some(permits) => Arc::clone(permits).acquire_owned().await.ok(),
            None => None,
        }
    }

    /// The directory service cannot look users up by email, so a valid
    /// address becomes an identity on its own.
    fn expand_email(&self, address: &str) -> Result<Identity, ResolveError> {
        let address = parse_address(address)?;
        Ok(Identity::from_email(address))
    }

    async fn expand_user(&self, login: &str) -> Result<Identity, ResolveError> {
        let _permit = self.permit().await;
        match self.directory.get_user(login).await {
            Ok(user) => {
                trace!("Fetched user @{} (id {})", user.login, user.id);
                Ok(Identity::from(user))
            }
            Err(e) => Err(ResolveError::lookup_failed(format!("@{}", login), e)),
        }
    }

    async fn expand_team(&self, org: &str, slug: &str) -> Result<(), ResolveError> {
        let team = self
            .find_team(org, slug)
            .await?
            .ok_or_else(|| ResolveError::TeamNotFound {
                org: org.to_string(),
                slug: slug.to_string(),
            })?;

        let org_id = match team.organization_id {
            Some(id) => id,
            None => self.organization_of(org, slug).await?,
        };

        debug!(
            "Found team @{}/{} (team id {}, organization id {})",
            org, slug, team.id, org_id
        );

        let directory = Arc::clone(&self.directory);
        let team_id = team.id;
        let per_page = self.config.member_page_size;
        let members = Paginator::<MemberRecord>::new(move |cursor| {
            let directory = Arc::clone(&directory);
            async move {
                directory
                    .list_team_members(org_id, team_id, cursor, per_page)
                    .await
            }
            .boxed()
        });

        let mut pages = pin!(members.pages());
        let mut count = 0usize;
        loop {
            let page = {
                let _permit = self.permit().await;
                pages.try_next().await
            };
            let page = page
                .map_err(|e| ResolveError::lookup_failed(format!("members of @{}/{}", org, slug), e))?;
            let Some(page) = page else { break };

            for member in page {
                count += 1;
                self.spawn(OwnerSpecifier::User {
                    login: member.login,
                });
            }
        }

        debug!("Team @{}/{} has {} member(s)", org, slug, count);
        Ok(())
    }

    /// Pages through the organization's teams until one has the slug.
    async fn find_team(&self, org: &str, slug: &str) -> Result<Option<TeamRecord>, ResolveError> {
        let directory = Arc::clone(&self.directory);
        let owner = org.to_string();
        let per_page = self.config.team_page_size;
        let teams = Paginator::<TeamRecord>::new(move |cursor| {
            let directory = Arc::clone(&directory);
            let owner = owner.clone();
            async move { directory.list_org_teams(&owner, cursor, per_page).await }.boxed()
        });

        let mut pages = pin!(teams.pages());
        loop {
            let page = {
                let _permit = self.permit().await;
                pages.try_next().await
            };
            let page =
                page.map_err(|e| ResolveError::lookup_failed(format!("teams of {}", org), e))?;
            let Some(page) = page else {
                debug!("No team {} in organization {}", slug, org);
                return Ok(None);
            };

            if let Some(team) = page.into_iter().find(|team| team.slug == slug) {
                return Ok(Some(team));
            }
        }
    }

    /// Looks the team up by slug to learn its organization id, for listings
    /// that leave it out.
    async fn organization_of(&self, org: &str, slug: &str) -> Result<u64, ResolveError> {
        let team = {
            let _permit = self.permit().await;
            self.directory.get_team_by_slug(org, slug).await
        };

        let failed = |source| ResolveError::OrganizationResolutionFailed {
            org: org.to_string(),
            slug: slug.to_string(),
            source,
        };

        match team {
            Ok(TeamRecord {
                organization_id: Some(id),
                ..
            }) => Ok(id),
            Ok(_) => Err(failed(None)),
            Err(e) => Err(failed(Some(e))),
        }
    }
}
