//! Authentication tokens

use chrono::{DateTime, Utc};

/// Who a token represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal<U> {
    /// An authenticated user
    User(U),
    /// An anonymous visitor, identified by an opaque string
    Anonymous(String),
}

/// Result of authenticating a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken<U> {
    principal: Principal<U>,
    roles: Vec<String>,
    authenticated_at: DateTime<Utc>,
}

impl<U> AuthToken<U> {
    /// Token for `principal`, authenticated now
    #[must_use]
    pub fn new(principal: Principal<U>) -> Self {
        Self {
            principal,
            roles: Vec::new(),
            authenticated_at: Utc::now(),
        }
    }

    /// Token for an authenticated user
    #[must_use]
    pub fn for_user(user: U) -> Self {
        Self::new(Principal::User(user))
    }

    /// Token for an anonymous visitor
    #[must_use]
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self::new(Principal::Anonymous(id.into()))
    }

    /// Attach roles
    #[must_use]
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// The principal
    #[must_use]
    pub const fn principal(&self) -> &Principal<U> {
        &self.principal
    }

    /// The user, unless the principal is anonymous
    #[must_use]
    pub const fn user(&self) -> Option<&U> {
        match &self.principal {
            Principal::User(user) => Some(user),
            Principal::Anonymous(_) => None,
        }
    }

    /// Whether the principal is anonymous
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self.principal, Principal::Anonymous(_))
    }

    /// Granted roles
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Whether `role` was granted
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// When authentication happened
    #[must_use]
    pub const fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_token() {
        let token = AuthToken::for_user("ada").with_roles(["ROLE_ADMIN"]);
        assert_eq!(token.user(), Some(&"ada"));
        assert!(!token.is_anonymous());
        assert!(token.has_role("ROLE_ADMIN"));
        assert!(!token.has_role("ROLE_USER"));
        assert!(token.authenticated_at() <= Utc::now());
    }

    #[test]
    fn test_anonymous_token() {
        let token = AuthToken::<String>::anonymous("anon.1");
        assert!(token.is_anonymous());
        assert_eq!(token.user(), None);
        assert_eq!(token.principal(), &Principal::Anonymous("anon.1".into()));
    }
}
