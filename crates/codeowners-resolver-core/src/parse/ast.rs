//! Data structures for parsed CODEOWNERS files.
//!
//! An [`OwnershipTable`] is the ordered list of rules that survived parsing,
//! together with the glob set compiled from their patterns.

use crate::matching::PatternSet;
use std::fmt::{self, Display};

/// A single `pattern owner...` line of a CODEOWNERS file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipRule {
    /// The glob pattern, with a bare `*` already normalized to `**`.
    pub pattern: String,
    /// The raw owner tokens in declaration order.
    pub specifiers: Vec<String>,
}

impl OwnershipRule {
    /// Creates a new rule from a pattern and its owner tokens.
    pub fn new<I, S>(pattern: impl Into<String>, specifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            specifiers: specifiers.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for OwnershipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pattern, self.specifiers.join(" "))
    }
}

/// The ordered rule table built from one CODEOWNERS file.
///
/// Immutable once built. Matching only reads from it, so a table can be
/// shared between tasks behind an `Arc` or a plain reference.
#[derive(Debug, Clone)]
pub struct OwnershipTable {
    rules: Vec<OwnershipRule>,
    patterns: PatternSet,
}

impl OwnershipTable {
    /// Creates a table from rules, compiling their patterns.
    pub fn new(rules: Vec<OwnershipRule>) -> Self {
        let patterns = PatternSet::new(&rules);
        Self { rules, patterns }
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[OwnershipRule] {
        &self.rules
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn patterns(&self) -> &PatternSet {
        &self.patterns
    }
}

impl Default for OwnershipTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// Two tables are equal when they hold the same rules; the compiled glob set
// is derived from them.
impl PartialEq for OwnershipTable {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for OwnershipTable {}

impl Display for OwnershipTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_creation() {
        let rule = OwnershipRule::new("*.rs", ["@rustacean", "dev@example.com"]);
        assert_eq!(rule.pattern, "*.rs");
        assert_eq!(rule.specifiers, vec!["@rustacean", "dev@example.com"]);
    }

    #[test]
    fn rule_display() {
        let rule = OwnershipRule::new("/docs/", ["@docs", "@org/writers"]);
        assert_eq!(rule.to_string(), "/docs/ @docs @org/writers");
    }

    #[test]
    fn table_display() {
        let table = OwnershipTable::new(vec![
            OwnershipRule::new("**", ["@alice"]),
            OwnershipRule::new("docs/*", ["@bob", "@carol"]),
        ]);
        assert_eq!(table.to_string(), "** @alice\ndocs/* @bob @carol");
    }

    #[test]
    fn table_display_empty() {
        assert_eq!(OwnershipTable::default().to_string(), "");
    }

    #[test]
    fn table_equality_ignores_compiled_patterns() {
        let a = OwnershipTable::new(vec![OwnershipRule::new("*.md", ["@docs"])]);
        let b = OwnershipTable::new(vec![OwnershipRule::new("*.md", ["@docs"])]);
        let c = OwnershipTable::new(vec![OwnershipRule::new("*.md", ["@other"])]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn table_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OwnershipTable>();
    }
}
