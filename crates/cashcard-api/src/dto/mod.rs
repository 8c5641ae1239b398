//! Data Transfer Objects
//!
//! Request and response structures for the API.

pub mod cash_card;
pub mod common;

pub use cash_card::*;
pub use common::*;
