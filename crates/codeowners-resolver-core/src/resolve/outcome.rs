//! Resolved identities and the aggregate result of a resolution.

use super::directory::UserRecord;
use super::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved owner.
///
/// Which fields are present depends on how the owner was resolved: email
/// owners only carry `email`, directory users carry `login` and `id` (and
/// `email` when their profile is public).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// The directory login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// The email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The directory's numeric identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl Identity {
    /// Creates an identity known only by its email address.
    pub fn from_email(address: impl Into<String>) -> Self {
        Self {
            email: Some(address.into()),
            ..Default::default()
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.login, &self.email) {
            (Some(login), Some(email)) => write!(f, "@{} <{}>", login, email),
            (Some(login), None) => write!(f, "@{}", login),
            (None, Some(email)) => f.write_str(email),
            (None, None) => f.write_str("<unknown>"),
        }
    }
}

impl From<UserRecord> for Identity {
    fn from(user: UserRecord) -> Self {
        Self {
            login: Some(user.login),
            email: user.email,
            id: Some(user.id),
        }
    }
}

/// Everything a resolution produced before it finished or was cancelled.
#[derive(Debug, Default)]
pub struct ResolutionOutcome {
    /// Resolved identities, in completion order. Not deduplicated.
    pub identities: Vec<Identity>,
    /// Errors from failed branches, in arrival order.
    pub errors: Vec<ResolveError>,
    /// Number of expansion tasks spawned, recursive ones included.
    pub tasks: usize,
    /// True if the call returned early because it was cancelled.
    pub cancelled: bool,
}

impl ResolutionOutcome {
    /// Creates an outcome holding a single error and no work.
    pub fn failed(error: ResolveError) -> Self {
        Self {
            errors: vec![error],
            ..Default::default()
        }
    }

    /// Returns true if at least one identity was resolved.
    ///
    /// An outcome without identities leaves nobody to notify and should be
    /// treated as a failure, whatever its errors say.
    pub fn is_resolved(&self) -> bool {
        !self.identities.is_empty()
    }

    /// Returns true if some identities were resolved but some branches failed.
    pub fn is_partial(&self) -> bool {
        self.is_resolved() && !self.errors.is_empty()
    }

    /// Returns true if there were errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_from_user_record() {
        let identity = Identity::from(UserRecord {
            login: "octocat".to_string(),
            id: 583231,
            email: None,
        });
        assert_eq!(identity.login.as_deref(), Some("octocat"));
        assert_eq!(identity.id, Some(583231));
        assert_eq!(identity.email, None);
    }

    #[test]
    fn email_identity_serializes_only_email() {
        let identity = Identity::from_email("person@example.org");
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "person@example.org" }));
    }

    #[test]
    fn identity_display() {
        let mut identity = Identity::from_email("person@example.org");
        assert_eq!(identity.to_string(), "person@example.org");

        identity.login = Some("person".to_string());
        assert_eq!(identity.to_string(), "@person <person@example.org>");

        identity.email = None;
        assert_eq!(identity.to_string(), "@person");
    }

    #[test]
    fn outcome_states() {
        let failed = ResolutionOutcome::failed(ResolveError::NoOwners);
        assert!(!failed.is_resolved());
        assert!(failed.has_errors());
        assert_eq!(failed.tasks, 0);

        let partial = ResolutionOutcome {
            identities: vec![Identity::from_email("a@b.c")],
            errors: vec![ResolveError::NoOwners],
            ..Default::default()
        };
        assert!(partial.is_resolved());
        assert!(partial.is_partial());
    }
}
