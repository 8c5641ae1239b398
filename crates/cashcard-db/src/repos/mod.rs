//! Repository implementations

mod cash_card;

pub use cash_card::CashCardRepo;
