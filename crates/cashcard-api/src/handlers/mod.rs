//! API Handlers
//!
//! Request handlers for all API endpoints.

pub mod cash_card;
pub mod health;

pub use cash_card::*;
pub use health::*;
