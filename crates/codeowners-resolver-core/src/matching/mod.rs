//! Pattern matching for CODEOWNERS files.
//!
//! Patterns are globs matched against paths relative to the repository root:
//!
//! - `*` matches any sequence of non-slash characters
//! - `**` matches any sequence including slashes (any depth)
//! - `?` matches a single non-slash character
//! - `/` at the start is ignored; every pattern is rooted at the repository root
//! - `/` at the end matches everything inside that directory
//!
//! When several rules match a path, the last one declared wins outright.

use crate::parse::{OwnershipRule, OwnershipTable};
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use log::{debug, trace, warn};
use thiserror::Error;

/// Error returned when no rule in a table applies to a path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// No rule pattern matched the path.
    #[error("failed to find owner for {path}")]
    NoMatch {
        /// The path that was looked up.
        path: String,
    },
}

/// A compiled CODEOWNERS pattern that can match file paths.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The original pattern string.
    original: String,
    /// The compiled glob matcher.
    matcher: GlobMatcher,
    /// Whether this pattern matches everything below a directory.
    directory: bool,
}

impl Pattern {
    /// Compiles a CODEOWNERS pattern for matching.
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let (glob, directory) = compile_glob(pattern)?;
        Ok(Self {
            original: pattern.to_string(),
            matcher: glob.compile_matcher(),
            directory,
        })
    }

    /// Returns the original pattern string.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Returns true if this pattern names a directory (trailing `/`).
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// Checks if this pattern matches the given path.
    ///
    /// The path should be relative to the repository root and use forward slashes.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(normalize_path(path))
    }
}

/// The compiled patterns of a table, for finding the winning rule of a path.
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// The glob set for batch matching.
    glob_set: GlobSet,
    /// Rule index for each glob in the set; invalid patterns have no entry.
    rule_indices: Vec<usize>,
}

impl PatternSet {
    /// Compiles the patterns of the given rules.
    ///
    /// A pattern that is not a valid glob is left out of the set, so its rule
    /// can never match.
    pub fn new(rules: &[OwnershipRule]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut rule_indices = Vec::with_capacity(rules.len());

        for (idx, rule) in rules.iter().enumerate() {
            match compile_glob(&rule.pattern) {
                Ok((glob, _)) => {
                    builder.add(glob);
                    rule_indices.push(idx);
                }
                Err(e) => warn!("Pattern {:?} never matches: {}", rule.pattern, e),
            }
        }

        let glob_set = builder.build().unwrap_or_else(|e| {
            // Every glob already compiled on its own; a set-level failure
            // (regex size limits) leaves the table without matches.
            warn!("Failed to compile CODEOWNERS patterns: {}", e);
            rule_indices.clear();
            GlobSet::empty()
        });

        Self {
            glob_set,
            rule_indices,
        }
    }

    /// Returns the rule indices of all patterns that match the path, ascending.
    pub fn matches(&self, path: &str) -> Vec<usize> {
        self.glob_set
            .matches(normalize_path(path))
            .into_iter()
            .map(|glob_idx| self.rule_indices[glob_idx])
            .collect()
    }

    /// Returns the index of the last declared rule that matches the path.
    ///
    /// In CODEOWNERS, later rules take precedence over earlier ones.
    pub fn last_match(&self, path: &str) -> Option<usize> {
        self.matches(path).last().copied()
    }

    /// Returns the number of compiled patterns.
    pub fn len(&self) -> usize {
        self.rule_indices.len()
    }

    /// Returns true if the set contains no patterns.
    pub fn is_empty(&self) -> bool {
        self.rule_indices.is_empty()
    }
}

/// Finds the owner specifiers that apply to `path`.
///
/// Every rule is tested and the last matching one wins; its specifier list is
/// returned unchanged.
pub fn match_path<'t>(table: &'t OwnershipTable, path: &str) -> Result<&'t [String], MatchError> {
    let matched = table.patterns().matches(path);
    for &idx in &matched {
        trace!("Pattern {:?} matches {}", table.rules()[idx].pattern, path);
    }

    match matched.last() {
        Some(&idx) => {
            let rule = &table.rules()[idx];
            debug!(
                "Found match for {}: {:?} -> {:?}",
                path, rule.pattern, rule.specifiers
            );
            Ok(&rule.specifiers)
        }
        None => {
            debug!("No rule matches {}", path);
            Err(MatchError::NoMatch {
                path: path.to_string(),
            })
        }
    }
}

impl OwnershipTable {
    /// Finds the owner specifiers that apply to `path`. See [`match_path`].
    pub fn match_path(&self, path: &str) -> Result<&[String], MatchError> {
        match_path(self, path)
    }
}

/// Strips a leading slash so paths are always relative to the root.
fn normalize_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Normalizes a CODEOWNERS pattern to a glob pattern.
///
/// Returns (glob_pattern, is_directory).
fn normalize_pattern(pattern: &str) -> (String, bool) {
    let mut glob = normalize_path(pattern).to_string();

    let directory = glob.ends_with('/');
    if directory {
        // docs/ should match docs/anything
        glob.push_str("**");
    }

    if glob.is_empty() {
        glob.push_str("**");
    }

    (glob, directory)
}

fn compile_glob(pattern: &str) -> Result<(Glob, bool), globset::Error> {
    let (glob_pattern, directory) = normalize_pattern(pattern);
    // Use literal_separator to ensure * doesn't match /
    let glob = GlobBuilder::new(&glob_pattern)
        .literal_separator(true)
        .build()?;
    Ok((glob, directory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::build_table;
    use std::sync::Arc;

    #[test]
    fn pattern_single_star_stops_at_separator() {
        let pattern = Pattern::new("docs/*").unwrap();
        assert!(pattern.matches("docs/readme.md"));
        assert!(!pattern.matches("docs/api/index.md"));
        assert!(!pattern.matches("other/docs/readme.md"));
    }

    #[test]
    fn pattern_double_star_crosses_separators() {
        let pattern = Pattern::new("**").unwrap();
        assert!(pattern.matches("main.rs"));
        assert!(pattern.matches("a/b/c/d.txt"));

        let pattern = Pattern::new("src/**/mod.rs").unwrap();
        assert!(pattern.matches("src/mod.rs"));
        assert!(pattern.matches("src/parse/lexer/mod.rs"));
        assert!(!pattern.matches("lib/parse/mod.rs"));
    }

    #[test]
    fn pattern_question_mark_is_one_character() {
        let pattern = Pattern::new("v?.txt").unwrap();
        assert!(pattern.matches("v1.txt"));
        assert!(!pattern.matches("v10.txt"));
        assert!(!pattern.matches("v/.txt"));
    }

    #[test]
    fn pattern_without_slash_is_rooted() {
        let pattern = Pattern::new("*.rs").unwrap();
        assert!(pattern.matches("main.rs"));
        assert!(!pattern.matches("src/main.rs"));
    }

    #[test]
    fn pattern_directory() {
        let pattern = Pattern::new("/src/").unwrap();
        assert!(pattern.is_directory());
        assert!(pattern.matches("src/main.rs"));
        assert!(pattern.matches("src/lib/mod.rs"));
        assert!(!pattern.matches("main.rs"));
        assert!(!pattern.matches("other/src/main.rs"));
    }

    #[test]
    fn pattern_matches_with_leading_slash() {
        let pattern = Pattern::new("/docs/*.md").unwrap();
        assert!(pattern.matches("docs/README.md"));
        assert!(pattern.matches("/docs/README.md"));
        assert_eq!(pattern.as_str(), "/docs/*.md");
    }

    #[test]
    fn pattern_invalid_glob() {
        assert!(Pattern::new("src/[").is_err());
    }

    #[test]
    fn normalize_pattern_cases() {
        assert_eq!(normalize_pattern("/src/"), ("src/**".to_string(), true));
        assert_eq!(normalize_pattern("*.rs"), ("*.rs".to_string(), false));
        assert_eq!(normalize_pattern("src/lib/"), ("src/lib/**".to_string(), true));
        assert_eq!(normalize_pattern("/"), ("**".to_string(), false));
    }

    #[test]
    fn later_narrower_rule_overrides_wildcard() {
        let table = build_table("* @alice\ndocs/* @bob\n");
        assert_eq!(table.match_path("docs/readme.md").unwrap(), ["@bob"]);
        assert_eq!(table.match_path("src/main.rs").unwrap(), ["@alice"]);
    }

    #[test]
    fn last_matching_rule_wins_without_merging() {
        let table = build_table("src/** @first\nsrc/*.rs @second @third\ndocs/** @fourth\n");
        assert_eq!(
            match_path(&table, "src/lib.rs").unwrap(),
            ["@second", "@third"]
        );
    }

    #[test]
    fn wildcard_declared_last_wins_everywhere() {
        let table = build_table("docs/* @bob\n* @alice\n");
        // The wildcard is declared last, so it wins even for docs.
        assert_eq!(table.match_path("docs/readme.md").unwrap(), ["@alice"]);
    }

    #[test]
    fn duplicate_specifiers_are_returned_unchanged() {
        let table = build_table("*.rs @a @b @a\n");
        assert_eq!(table.match_path("lib.rs").unwrap(), ["@a", "@b", "@a"]);
    }

    #[test]
    fn no_rules_means_no_match() {
        let table = build_table("# only a comment\n\n");
        assert_eq!(
            table.match_path("anything.txt"),
            Err(MatchError::NoMatch {
                path: "anything.txt".to_string()
            })
        );
    }

    #[test]
    fn no_matching_rule() {
        let table = build_table("docs/* @bob\n");
        assert!(matches!(
            table.match_path("src/main.rs"),
            Err(MatchError::NoMatch { .. })
        ));
    }

    #[test]
    fn invalid_pattern_never_matches_but_keeps_other_rules() {
        let table = build_table("* @alice\nsrc/[ @broken\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.patterns().len(), 1);
        assert_eq!(table.match_path("src/[").unwrap(), ["@alice"]);
    }

    #[test]
    fn pattern_set_reports_rule_indices() {
        let table = build_table("** @a\nbad[ @b\n*.md @c\n");
        assert_eq!(table.patterns().matches("README.md"), vec![0, 2]);
        assert_eq!(table.patterns().last_match("README.md"), Some(2));
        assert_eq!(table.patterns().last_match("src/x.rs"), Some(0));
    }

    #[test]
    fn concurrent_matches_are_independent() {
        let table = Arc::new(build_table("* @alice\ndocs/* @bob\nsrc/** @carol\n"));
        let cases = [
            ("docs/readme.md", "@bob"),
            ("src/a/b.rs", "@carol"),
            ("Cargo.toml", "@alice"),
        ];

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let table = Arc::clone(&table);
                let (path, owner) = cases[i % cases.len()];
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        assert_eq!(table.match_path(path).unwrap(), [owner]);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
