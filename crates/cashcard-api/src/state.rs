//! Application state shared across handlers

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use cashcard_auth::Authenticator;
use cashcard_db::CashCardStore;

/// Which cards `GET /cards` returns.
///
/// `Owner` lists only the caller's cards. `All` reproduces the legacy
/// behaviour of listing every card in the store regardless of owner and
/// must be opted into explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardListScope {
    #[default]
    Owner,
    All,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Record store
    pub store: Arc<dyn CashCardStore>,
    /// Credential verifier used by the auth layer
    pub authenticator: Arc<dyn Authenticator>,
    /// Realm advertised in Basic challenges
    pub realm: String,
    /// Listing scope for `GET /cards`
    pub list_scope: CardListScope,
}

impl AppState {
    pub fn new(store: Arc<dyn CashCardStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            store,
            authenticator,
            realm: "cashcard".to_string(),
            list_scope: CardListScope::default(),
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn with_list_scope(mut self, list_scope: CardListScope) -> Self {
        self.list_scope = list_scope;
        self
    }
}
