//! Mail address validation for email owners.
//!
//! Accepts the single-token forms a CODEOWNERS line can carry:
//! `local@domain`, `<local@domain>` and `Name<local@domain>`. Both halves of
//! the address are RFC 5322 dot-atoms.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{all_consuming, recognize},
    multi::separated_list1,
    sequence::delimited,
};
use thiserror::Error;

/// An email owner that is not a valid mail address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid email address {address:?}: {reason}")]
pub struct EmailParseError {
    /// The token that failed to parse.
    pub address: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

/// Characters allowed in an unquoted atom.
fn is_atext(c: char) -> bool {
    c.is_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

/// Parses atoms separated by single dots (`a.b.c`).
fn dot_atom(input: &str) -> IResult<&str, &str> {
    recognize(separated_list1(char('.'), take_while1(is_atext))).parse(input)
}

/// Parses `local@domain`.
fn addr_spec(input: &str) -> IResult<&str, (&str, &str)> {
    (dot_atom, char('@'), dot_atom)
        .map(|(local, _, domain)| (local, domain))
        .parse(input)
}

/// Parses `<local@domain>` with an optional display name in front.
fn angle_addr(input: &str) -> IResult<&str, (&str, &str)> {
    (
        take_while(|c: char| c != '<'),
        delimited(char('<'), addr_spec, char('>')),
    )
        .map(|(_, address)| address)
        .parse(input)
}

/// Validates an email owner token and returns the bare address.
pub fn parse_address(token: &str) -> Result<String, EmailParseError> {
    let fail = |reason| EmailParseError {
        address: token.to_string(),
        reason,
    };

    if token.is_empty() {
        return Err(fail("address is empty"));
    }
    if !token.contains('@') {
        return Err(fail("missing @"));
    }

    match all_consuming(alt((angle_addr, addr_spec))).parse(token) {
        Ok((_, (local, domain))) => Ok(format!("{}@{}", local, domain)),
        Err(_) => Err(fail("expected local@domain or Name <local@domain>")),
    }
}
