//! CODEOWNERS Resolver Core
//!
//! A library for answering "who owns this file?" from a GitHub CODEOWNERS
//! file.
//!
//! # Features
//!
//! - **Parser**: Build an ordered rule table from CODEOWNERS text
//! - **Matcher**: Find the rule that applies to a path (last match wins)
//! - **Resolver**: Expand user, team and email owners into identities,
//!   concurrently and with cancellation
//! - **Renderer**: Write a rule table back out in normalized form
//!
//! # Quick Start
//!
//! ```rust
//! use codeowners_resolver_core::parse::build_table;
//!
//! let input = r#"
//! # CODEOWNERS file
//! *       @org/everyone
//! docs/*  @docs-lead docs@example.com
//! "#;
//!
//! let table = build_table(input);
//! let owners = table.match_path("docs/readme.md").unwrap();
//! assert_eq!(owners, ["@docs-lead", "docs@example.com"]);
//! ```
//!
//! Resolving the matched owners needs a [`DirectoryService`]:
//!
//! ```rust,ignore
//! use codeowners_resolver_core::{Resolver, build_table};
//! use tokio_util::sync::CancellationToken;
//!
//! let resolver = Resolver::new(directory);
//! let outcome = resolver
//!     .resolve_path(&table, "docs/readme.md", &CancellationToken::new())
//!     .await;
//! ```
//!
//! # Modules
//!
//! - [`parse`]: Parser and renderer for CODEOWNERS files
//! - [`matching`]: Pattern matching against a rule table
//! - [`owners`]: Owner token classification
//! - [`resolve`]: Concurrent owner resolution
//! - [`fetch`]: Locating the CODEOWNERS file in a repository

pub mod fetch;
#[cfg(feature = "generate")]
pub mod generate;
pub mod matching;
pub mod owners;
pub mod parse;
pub mod resolve;

// Re-export commonly used types at the crate root
pub use fetch::{
    FetchError, LocalRepository, OwnershipFileSource, RepositoryRef, SourceError,
    fetch_ownership_file,
};
pub use matching::{MatchError, match_path};
pub use owners::{OwnerSpecifier, UnrecognizedSpecifier};
pub use parse::{OwnershipRule, OwnershipTable, build_table, render};
pub use resolve::{
    DirectoryError, DirectoryService, Identity, ResolutionOutcome, ResolveError, Resolver,
    ResolverConfig,
};
