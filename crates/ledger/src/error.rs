//! Ledger errors.

use lockstep_core::{AccountId, DomainError};
use thiserror::Error;

/// Every way a ledger operation can be refused.
///
/// All variants except [`LedgerError::InvariantViolation`] are ordinary
/// outcomes under concurrent load and are returned, never raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("cannot transfer from account {0} to itself")]
    SelfTransfer(AccountId),

    #[error("account {id} is out of range (ledger has {len} accounts)")]
    AccountOutOfRange { id: AccountId, len: usize },

    #[error("insufficient funds in account {id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        id: AccountId,
        balance: u64,
        requested: u64,
    },

    #[error("starting balances overflow the ledger total")]
    TotalOverflow,

    /// Money was lost or created. Indicates a locking bug; never retry.
    #[error("ledger total {actual} does not match initial total {expected}")]
    InvariantViolation { expected: u64, actual: u64 },
}

impl From<LedgerError> for DomainError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountOutOfRange { .. } => DomainError::invalid_id(err.to_string()),
            LedgerError::InvariantViolation { .. } => DomainError::invariant(err.to_string()),
            LedgerError::SelfTransfer(_)
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::TotalOverflow => DomainError::validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_domain_errors() {
        let err: DomainError = LedgerError::InvariantViolation {
            expected: 10,
            actual: 9,
        }
        .into();
        assert!(err.is_fatal());

        let err: DomainError = LedgerError::AccountOutOfRange {
            id: AccountId::new(99),
            len: 3,
        }
        .into();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.contains("99")));
    }
}
