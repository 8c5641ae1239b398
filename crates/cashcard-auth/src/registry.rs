//! User registry and the `Authenticator` seam
//!
//! Handlers never see credentials; they receive the principal produced by
//! an [`Authenticator`]. [`UserRegistry`] is the default implementation,
//! seeded from configuration.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::config::{AuthConfig, UserSeed};
use crate::error::{AuthError, AuthResult};
use crate::password::PasswordService;
use crate::types::{AuthenticatedUser, BasicCredentials, Role};

/// Verifies a presented credential and yields the principal
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, credentials: &BasicCredentials) -> AuthResult<AuthenticatedUser>;
}

struct RegisteredUser {
    password_hash: String,
    roles: HashSet<Role>,
}

/// In-memory registry of users with Argon2id password hashes
pub struct UserRegistry {
    users: HashMap<String, RegisteredUser>,
    password: PasswordService,
    /// Verified against when the username is unknown, so both failure paths
    /// cost one hash verification.
    dummy_hash: String,
}

impl UserRegistry {
    /// Build a registry from configuration, hashing plaintext seeds
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let password = PasswordService::new(config.password.clone());
        let dummy_hash = password.hash_password("cashcard-unknown-user")?;

        let mut users = HashMap::with_capacity(config.users.len());
        for seed in &config.users {
            let password_hash = Self::seed_hash(&password, seed)?;
            if users
                .insert(
                    seed.username.clone(),
                    RegisteredUser {
                        password_hash,
                        roles: seed.roles.iter().copied().collect(),
                    },
                )
                .is_some()
            {
                return Err(AuthError::Config(format!(
                    "duplicate user '{}' in registry",
                    seed.username
                )));
            }
        }

        debug!(users = users.len(), "User registry loaded");

        Ok(Self {
            users,
            password,
            dummy_hash,
        })
    }

    fn seed_hash(password: &PasswordService, seed: &UserSeed) -> AuthResult<String> {
        match (&seed.password_hash, &seed.password) {
            (Some(hash), None) => {
                password.validate_hash(hash)?;
                Ok(hash.clone())
            }
            (None, Some(plain)) => password.hash_password(plain),
            _ => Err(AuthError::Config(format!(
                "user '{}' needs exactly one of password or password_hash",
                seed.username
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn into_authenticator(self) -> Arc<dyn Authenticator> {
        Arc::new(self)
    }
}

#[async_trait]
impl Authenticator for UserRegistry {
    async fn verify(&self, credentials: &BasicCredentials) -> AuthResult<AuthenticatedUser> {
        let user = self.users.get(&credentials.username);
        let hash = user
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());

        // Argon2 is CPU bound; keep it off the async workers.
        let service = self.password.clone();
        let presented = credentials.password.clone();
        let matches = tokio::task::spawn_blocking(move || service.verify_password(&presented, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))??;

        match user {
            Some(user) if matches => Ok(AuthenticatedUser {
                username: credentials.username.clone(),
                roles: user.roles.clone(),
            }),
            _ => {
                debug!(username = %credentials.username, "Rejected credentials");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordConfig;

    fn config(users: Vec<UserSeed>) -> AuthConfig {
        AuthConfig {
            password: PasswordConfig::insecure_fast(),
            users,
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_verify_known_user() {
        let registry = UserRegistry::from_config(&config(vec![UserSeed::with_password(
            "sarah1",
            "abc123",
            [Role::CardOwner],
        )]))
        .unwrap();

        let user = registry
            .verify(&BasicCredentials::new("sarah1", "abc123"))
            .await
            .unwrap();
        assert_eq!(user.username, "sarah1");
        assert!(user.has_role(Role::CardOwner));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let registry = UserRegistry::from_config(&config(vec![UserSeed::with_password(
            "sarah1",
            "abc123",
            [Role::CardOwner],
        )]))
        .unwrap();

        let wrong = registry.verify(&BasicCredentials::new("sarah1", "nope")).await;
        let unknown = registry.verify(&BasicCredentials::new("mallory", "abc123")).await;

        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_prehashed_seed() {
        let hash = PasswordService::new(PasswordConfig::insecure_fast())
            .hash_password("xyz789")
            .unwrap();
        let registry = UserRegistry::from_config(&config(vec![UserSeed {
            username: "kumar2".to_string(),
            password: None,
            password_hash: Some(hash),
            roles: vec![Role::CardOwner],
        }]))
        .unwrap();

        assert!(registry.verify(&BasicCredentials::new("kumar2", "xyz789")).await.is_ok());
    }

    #[test]
    fn test_seed_without_secret_rejected() {
        let result = UserRegistry::from_config(&config(vec![UserSeed {
            username: "ghost".to_string(),
            password: None,
            password_hash: None,
            roles: vec![],
        }]));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_duplicate_users_rejected() {
        let result = UserRegistry::from_config(&config(vec![
            UserSeed::with_password("sarah1", "a", [Role::CardOwner]),
            UserSeed::with_password("sarah1", "b", [Role::NonOwner]),
        ]));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_default_registry_loads() {
        let registry = UserRegistry::from_config(&AuthConfig {
            password: PasswordConfig::insecure_fast(),
            ..AuthConfig::default()
        })
        .unwrap();
        assert_eq!(registry.len(), 3);
    }
}
