//! Author and committer identities for the fast-import stream.

use std::env;
use std::fmt;

/// A `Name <email>` pair as rendered in `author` and `committer` lines.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ident {
    /// Display name. For unmapped RCS logins this is the login itself.
    pub name: String,
    /// Email address; empty when unknown.
    pub email: String,
}

impl Ident {
    /// Creates an identity from a name and email.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Fallback identity for an RCS login with no authors-map entry:
    /// the login as the name and an empty email.
    #[must_use]
    pub fn from_login(login: &str) -> Self {
        Self::new(login, "")
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Discovers the committer identity from the environment.
///
/// Lookup order mirrors what git itself consults before falling back to
/// system defaults: `GIT_COMMITTER_NAME`/`GIT_COMMITTER_EMAIL`, then the
/// login from `USER` or `LOGNAME` with an empty email, then a fixed
/// `unknown <>` identity so output stays well-formed on stripped-down
/// environments.
#[must_use]
pub fn host_identity() -> Ident {
    if let Ok(name) = env::var("GIT_COMMITTER_NAME") {
        if !name.is_empty() {
            let email = env::var("GIT_COMMITTER_EMAIL").unwrap_or_default();
            return Ident::new(name, email);
        }
    }
    for var in ["USER", "LOGNAME"] {
        if let Ok(login) = env::var(var) {
            if !login.is_empty() {
                return Ident::from_login(&login);
            }
        }
    }
    Ident::from_login("unknown")
}

#[cfg(test)]
mod tests {
    use super::Ident;

    #[test]
    fn renders_name_and_email() {
        let ident = Ident::new("Alice Example", "alice@example.org");
        assert_eq!(ident.to_string(), "Alice Example <alice@example.org>");
    }

    #[test]
    fn login_fallback_has_empty_email() {
        let ident = Ident::from_login("bob");
        assert_eq!(ident.to_string(), "bob <>");
    }
}
