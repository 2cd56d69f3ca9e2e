//! Serializes a rule table back to CODEOWNERS text.

use super::ast::OwnershipTable;

/// Renders a table as CODEOWNERS text, one `pattern owner...` rule per line.
///
/// Comments, blank lines and original spacing are not preserved, but
/// parsing the output yields a table equal to the input.
pub fn render(table: &OwnershipTable) -> String {
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::build_table;

    #[test]
    fn render_joins_rules_with_newlines() {
        let table = build_table("* @alice\n\ndocs/*   @bob @carol\n");
        assert_eq!(render(&table), "** @alice\ndocs/* @bob @carol");
    }

    #[test]
    fn render_round_trips_through_parser() {
        let input = r#"
# Default owners
*       @org/everyone

# Docs
/docs/  @docs dev@example.com
docs/*.md @bob @bob
   *.rs @rustacean   # trailing text stays a token
lonely-pattern
"#;
        let table = build_table(input);
        let reparsed = build_table(&render(&table));
        assert_eq!(reparsed, table);
        assert_eq!(reparsed.len(), 4);
    }

    #[test]
    fn render_empty_table() {
        assert_eq!(render(&build_table("# nothing here\n")), "");
    }
}
