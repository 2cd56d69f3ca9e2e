//! Line and file-level parsing for CODEOWNERS files.
//!
//! Parsing is lenient by construction: anything that is not a rule with at
//! least one owner is dropped, so building a table never fails.

use super::ast::{OwnershipRule, OwnershipTable};
use super::lexer::{is_blank_line, parse_comment_line, parse_rule_components};
use log::{debug, trace};

/// Pattern that a bare `*` is rewritten to, so it matches at any depth.
const MATCH_EVERYTHING: &str = "**";

/// Parses a single line into a rule, or `None` if the line contributes none.
fn parse_line(line_text: &str, line_num: usize) -> Option<OwnershipRule> {
    let line = line_text.trim();

    if is_blank_line(line) {
        return None;
    }

    if parse_comment_line(line).is_ok() {
        trace!("Line {}: comment", line_num);
        return None;
    }

    match parse_rule_components(line) {
        Ok((_rest, components)) => {
            let pattern = match components.pattern {
                "*" => MATCH_EVERYTHING,
                other => other,
            };
            trace!(
                "Line {}: pattern {:?} with {} owner(s)",
                line_num,
                pattern,
                components.owners.len()
            );
            Some(OwnershipRule::new(pattern, components.owners))
        }
        Err(_) => {
            trace!("Line {}: pattern without owners, skipped", line_num);
            None
        }
    }
}

/// Builds an ownership table from the raw text of a CODEOWNERS file.
///
/// Blank lines, `#` comments and lines with a pattern but no owners are
/// dropped. A bare `*` pattern is normalized to `**`.
pub fn build_table(input: &str) -> OwnershipTable {
    debug!("Parsing CODEOWNERS file ({} bytes)", input.len());

    let rules: Vec<OwnershipRule> = input
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_line(line, idx + 1))
        .collect();

    debug!("Parsing complete: {} rule(s)", rules.len());
    OwnershipTable::new(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_file() {
        assert!(build_table("").is_empty());
    }

    #[test]
    fn comments_and_blank_lines_produce_no_rules() {
        let input = "# CODEOWNERS\n\n   \n\t# indented comment\n#*.rs @nobody\n";
        assert!(build_table(input).is_empty());
    }

    #[test]
    fn parse_simple_rule() {
        let table = build_table("*.rs @rustacean\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rules()[0], OwnershipRule::new("*.rs", ["@rustacean"]));
    }

    #[test]
    fn parse_preserves_declaration_order() {
        let table = build_table("a @one\nb @two\nc @three\n");
        let patterns: Vec<&str> = table.rules().iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["a", "b", "c"]);
    }

    #[test]
    fn bare_star_is_normalized() {
        let table = build_table("* @everyone\n*.md @docs\n");
        assert_eq!(table.rules()[0].pattern, "**");
        assert_eq!(table.rules()[1].pattern, "*.md");
    }

    #[test]
    fn single_token_lines_are_dropped() {
        let table = build_table("/vendor/\n*.rs @rustacean\nlonely\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rules()[0].pattern, "*.rs");
    }

    #[test]
    fn surrounding_whitespace_and_crlf_are_trimmed() {
        let table = build_table("   docs/*   @bob\t @carol  \r\n*.go @gopher\r\n");
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rules()[0],
            OwnershipRule::new("docs/*", ["@bob", "@carol"])
        );
        assert_eq!(table.rules()[1], OwnershipRule::new("*.go", ["@gopher"]));
    }

    #[test]
    fn owner_tokens_are_kept_raw() {
        let table = build_table("*.rs @a not-an-owner a@b.c @org/team\n");
        assert_eq!(
            table.rules()[0].specifiers,
            vec!["@a", "not-an-owner", "a@b.c", "@org/team"]
        );
    }
}
