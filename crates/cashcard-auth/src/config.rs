//! Authentication configuration

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Main authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Realm advertised in Basic challenges
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,
    /// Users seeded into the registry at startup
    #[serde(default = "default_users")]
    pub users: Vec<UserSeed>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            password: PasswordConfig::default(),
            users: default_users(),
        }
    }
}

/// Password hashing configuration (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KiB (OWASP recommends 19456 KiB = 19 MiB minimum)
    pub memory_cost: u32,
    /// Time cost (iterations) - OWASP recommends 2 minimum
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
    /// Output hash length in bytes
    pub hash_length: u32,
    /// Pepper (additional secret, optional)
    pub pepper: Option<String>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
            pepper: None,
        }
    }
}

impl PasswordConfig {
    /// Minimal-cost parameters for tests
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            hash_length: 32,
            pepper: None,
        }
    }
}

/// A registry entry.
///
/// Exactly one of `password` (hashed at startup) or `password_hash` (an
/// Argon2 PHC string) must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSeed {
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserSeed {
    pub fn with_password(
        username: impl Into<String>,
        password: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
            password_hash: None,
            roles: roles.into_iter().collect(),
        }
    }
}

fn default_realm() -> String {
    "cashcard".to_string()
}

/// Development users
fn default_users() -> Vec<UserSeed> {
    vec![
        UserSeed::with_password("sarah1", "abc123", [Role::CardOwner]),
        UserSeed::with_password("henrique", "henrique", [Role::CardOwner]),
        UserSeed::with_password("hank-owns-no-cards", "qrs456", [Role::NonOwner]),
    ]
}
