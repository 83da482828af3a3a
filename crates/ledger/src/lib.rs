//! Multi-account ledger with concurrent transfers and consistent snapshots.
//!
//! Pure in-memory logic: no IO, no persistence. Every account has its own
//! lock; multi-account operations take locks in ascending id order (see
//! [`ordering`]).

pub mod account;
pub mod error;
pub mod ledger;
mod ordering;

pub use account::Account;
pub use error::LedgerError;
pub use ledger::{Ledger, LedgerSnapshot};
pub use lockstep_core::AccountId;
