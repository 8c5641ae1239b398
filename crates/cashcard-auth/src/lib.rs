//! Cash Card Authentication Layer
//!
//! Per-request HTTP Basic authentication:
//!
//! - **Credential parsing**: `Authorization: Basic ...` decoding
//! - **Authenticator**: pluggable `verify(credentials) -> principal` seam
//! - **User registry**: config-seeded users with Argon2id password hashes
//! - **Role guard**: only `card-owner` principals reach card routes
//!
//! # Flow
//!
//! ```text
//! Request → AuthLayer ──(Basic credentials)──▶ Authenticator::verify
//!              │                                      │
//!              │◀──────── AuthenticatedUser ──────────┘
//!              ▼
//!     require_card_owner (401 / 403) → Handler
//! ```
//!
//! There are no tokens or sessions; every request carries its credential.

pub mod basic;
pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod registry;
pub mod types;

pub use basic::{encode_basic, extract_basic_credentials};
pub use config::{AuthConfig, PasswordConfig, UserSeed};
pub use error::{AuthError, AuthResult};
pub use middleware::{require_card_owner, AuthLayer, AuthMiddleware};
pub use password::PasswordService;
pub use registry::{Authenticator, UserRegistry};
pub use types::*;
