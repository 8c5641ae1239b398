//! Core authentication types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Authenticated principal attached to request extensions by the auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Principal name; used as the owner of cash cards
    pub username: String,
    /// Granted roles
    pub roles: HashSet<Role>,
}

impl AuthenticatedUser {
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// May reach `/cards/**`
    #[serde(alias = "CARD-OWNER")]
    CardOwner,
    /// Authenticates, but owns no cards
    #[serde(alias = "NON-OWNER")]
    NonOwner,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardOwner => write!(f, "card-owner"),
            Self::NonOwner => write!(f, "non-owner"),
        }
    }
}

/// Decoded HTTP Basic credential
pub struct BasicCredentials {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Realm advertised in `WWW-Authenticate` challenges.
///
/// The auth layer stores it in request extensions so downstream guards can
/// issue the same challenge.
#[derive(Debug, Clone)]
pub struct AuthRealm(pub Arc<str>);

impl AuthRealm {
    pub fn challenge(&self) -> String {
        format!("Basic realm=\"{}\"", self.0)
    }
}

impl Default for AuthRealm {
    fn default() -> Self {
        Self(Arc::from("cashcard"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_accepts_both_spellings() {
        let roles: Vec<Role> = serde_json::from_str(r#"["card-owner", "NON-OWNER"]"#).unwrap();
        assert_eq!(roles, vec![Role::CardOwner, Role::NonOwner]);
    }

    #[test]
    fn test_has_role() {
        let user = AuthenticatedUser::new("sarah1", [Role::CardOwner]);
        assert!(user.has_role(Role::CardOwner));
        assert!(!user.has_role(Role::NonOwner));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = BasicCredentials::new("sarah1", "abc123");
        assert!(!format!("{:?}", creds).contains("abc123"));
    }

    #[test]
    fn test_realm_challenge() {
        assert_eq!(AuthRealm::default().challenge(), "Basic realm=\"cashcard\"");
    }
}
