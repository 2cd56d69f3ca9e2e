//! Lexer and token parsers for CODEOWNERS files.
//!
//! This module contains nom-based parsers for the pieces of a line:
//! comment markers and whitespace-separated tokens.

use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, space0},
    combinator::rest,
    multi::separated_list1,
    sequence::preceded,
};

/// Characters that can appear in a token (anything but whitespace).
fn is_token_char(c: char) -> bool {
    !c.is_whitespace()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
}

/// Parses a complete comment line (optional whitespace + # + content).
pub fn parse_comment_line(input: &str) -> IResult<&str, &str> {
    (space0, char('#'), rest)
        .map(|(_, _, content)| content)
        .parse(input)
}

/// Checks if a line is blank (empty or only whitespace).
pub fn is_blank_line(input: &str) -> bool {
    input.trim().is_empty()
}

/// Splits a line into its whitespace-separated tokens.
///
/// Any Unicode whitespace separates tokens, not just spaces and tabs.
pub fn parse_tokens(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        take_while(is_separator),
        separated_list1(
            take_while1(is_separator),
            take_while1(is_token_char),
        ),
    )
    .parse(input)
}

/// Result of parsing a rule line's components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleComponents<'a> {
    /// The pattern text.
    pub pattern: &'a str,
    /// The raw owner tokens, in declaration order.
    pub owners: Vec<&'a str>,
}

/// Parses the components of a rule line (pattern + at least one owner).
///
/// A line with a single token fails with `ErrorKind::Many1`; the caller
/// decides whether that is worth reporting.
pub fn parse_rule_components(input: &str) -> IResult<&str, RuleComponents<'_>> {
    let (rest, tokens) = parse_tokens(input)?;

    match tokens.split_first() {
        Some((pattern, owners)) if !owners.is_empty() => Ok((
            rest,
            RuleComponents {
                pattern,
                owners: owners.to_vec(),
            },
        )),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Many1,
        ))),
    }
}
