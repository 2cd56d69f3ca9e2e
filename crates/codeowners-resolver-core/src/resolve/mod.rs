//! Owner resolution.
//!
//! Turns the owner tokens of a matched rule into concrete identities,
//! expanding teams into their members through a [`DirectoryService`].
//!
//! # Example
//!
//! ```rust,ignore
//! use codeowners_resolver_core::resolve::Resolver;
//! use tokio_util::sync::CancellationToken;
//!
//! let resolver = Resolver::new(directory);
//! let outcome = resolver
//!     .resolve(&["@org/team", "dev@example.com"], &CancellationToken::new())
//!     .await;
//! for identity in &outcome.identities {
//!     println!("{}", identity);
//! }
//! ```

mod directory;
mod engine;
mod error;
mod outcome;
mod pagination;

pub use directory::{
    DirectoryError, DirectoryService, MemberRecord, Page, PageCursor, TeamRecord, UserRecord,
};
pub use engine::{Resolver, ResolverConfig};
pub use error::ResolveError;
pub use outcome::{Identity, ResolutionOutcome};
pub use pagination::Paginator;
