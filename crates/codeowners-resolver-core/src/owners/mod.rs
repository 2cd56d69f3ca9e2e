//! Owner specifier classification.
//!
//! Every raw owner token from a CODEOWNERS rule is classified exactly once
//! into an [`OwnerSpecifier`]; the resolution engine only ever sees the
//! classified form.

mod mail;

pub use mail::{EmailParseError, parse_address};

use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

/// A token that is neither a team, a user, nor an email address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("do not understand owner specifier {token:?}")]
pub struct UnrecognizedSpecifier {
    /// The raw token as it appeared in the CODEOWNERS file.
    pub token: String,
}

/// A classified owner token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerSpecifier {
    /// A team (`@org/slug`).
    Team {
        /// The organization login.
        org: String,
        /// The team slug within the organization.
        slug: String,
    },
    /// A user (`@login`).
    User {
        /// The login without the leading `@`.
        login: String,
    },
    /// An email address, not yet validated.
    Email {
        /// The whole token.
        address: String,
    },
}

impl OwnerSpecifier {
    /// Classifies a raw owner token.
    ///
    /// - `@org/slug` is a team (split at the first `/`)
    /// - `@login` is a user
    /// - anything else containing `@` is an email address
    ///
    /// Empty org, slug or login parts are rejected.
    pub fn classify(token: &str) -> Result<Self, UnrecognizedSpecifier> {
        let unrecognized = || UnrecognizedSpecifier {
            token: token.to_string(),
        };

        if let Some(stripped) = token.strip_prefix('@') {
            if let Some((org, slug)) = stripped.split_once('/') {
                if org.is_empty() || slug.is_empty() {
                    return Err(unrecognized());
                }
                return Ok(Self::Team {
                    org: org.to_string(),
                    slug: slug.to_string(),
                });
            }
            if stripped.is_empty() {
                return Err(unrecognized());
            }
            return Ok(Self::User {
                login: stripped.to_string(),
            });
        }

        if token.contains('@') {
            return Ok(Self::Email {
                address: token.to_string(),
            });
        }

        Err(unrecognized())
    }

    /// Returns a short name for the kind of owner.
    pub fn kind(&self) -> &'static str {
        match self {
            OwnerSpecifier::Team { .. } => "team",
            OwnerSpecifier::User { .. } => "user",
            OwnerSpecifier::Email { .. } => "email",
        }
    }
}

impl FromStr for OwnerSpecifier {
    type Err = UnrecognizedSpecifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::classify(s)
    }
}

impl Display for OwnerSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerSpecifier::Team { org, slug } => write!(f, "@{}/{}", org, slug),
            OwnerSpecifier::User { login } => write!(f, "@{}", login),
            OwnerSpecifier::Email { address } => f.write_str(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_team() {
        assert_eq!(
            OwnerSpecifier::classify("@github/core"),
            Ok(OwnerSpecifier::Team {
                org: "github".to_string(),
                slug: "core".to_string()
            })
        );
    }

    #[test]
    fn classify_team_splits_at_first_slash() {
        assert_eq!(
            OwnerSpecifier::classify("@org/team/extra"),
            Ok(OwnerSpecifier::Team {
                org: "org".to_string(),
                slug: "team/extra".to_string()
            })
        );
    }

    #[test]
    fn classify_user() {
        assert_eq!(
            OwnerSpecifier::classify("@octocat"),
            Ok(OwnerSpecifier::User {
                login: "octocat".to_string()
            })
        );
    }

    #[test]
    fn classify_email() {
        assert_eq!(
            "person@example.org".parse::<OwnerSpecifier>(),
            Ok(OwnerSpecifier::Email {
                address: "person@example.org".to_string()
            })
        );
        // Shape only: validation happens during resolution.
        assert!(matches!(
            OwnerSpecifier::classify("not@valid@email"),
            Ok(OwnerSpecifier::Email { .. })
        ));
    }

    #[test]
    fn classify_unrecognized() {
        for token in ["noatsign", "@", "@/team", "@org/", "#"] {
            assert_eq!(
                OwnerSpecifier::classify(token),
                Err(UnrecognizedSpecifier {
                    token: token.to_string()
                }),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn unrecognized_display() {
        let err = OwnerSpecifier::classify("nobody").unwrap_err();
        assert_eq!(
            err.to_string(),
            "do not understand owner specifier \"nobody\""
        );
    }

    #[test]
    fn display_round_trips_token() {
        for token in ["@org/team", "@login", "a@b.c"] {
            assert_eq!(OwnerSpecifier::classify(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn kind_names() {
        assert_eq!(OwnerSpecifier::classify("@o/t").unwrap().kind(), "team");
        assert_eq!(OwnerSpecifier::classify("@u").unwrap().kind(), "user");
        assert_eq!(OwnerSpecifier::classify("u@x.y").unwrap().kind(), "email");
    }
}
