//! Parser module for CODEOWNERS files.
//!
//! This module turns the raw text of a CODEOWNERS file into an ordered
//! [`OwnershipTable`] and renders tables back to text.
//!
//! # Example
//!
//! ```rust
//! use codeowners_resolver_core::parse::{build_table, render};
//!
//! let input = r#"
//! # CODEOWNERS file
//! *       @org/everyone
//! /docs/  @docs-team
//! "#;
//!
//! let table = build_table(input);
//! assert_eq!(table.len(), 2);
//! assert_eq!(render(&table), "** @org/everyone\n/docs/ @docs-team");
//! ```

mod ast;
mod lexer;
mod parser;
mod render;

// Re-export public types
pub use ast::{OwnershipRule, OwnershipTable};
pub use parser::build_table;
pub use render::render;

// Re-export lexer utilities that may be useful for custom parsing
pub use lexer::{RuleComponents, parse_rule_components, parse_tokens};
