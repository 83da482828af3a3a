//! Strongly-typed identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Index of an account inside a ledger.
///
/// Ids are dense (`0..N`) and totally ordered; the order is the lock order
/// used by every multi-account operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(usize);

impl AccountId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<usize> for AccountId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl From<AccountId> for usize {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl FromStr for AccountId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s
            .trim()
            .parse::<usize>()
            .map_err(|e| DomainError::invalid_id(format!("AccountId: {e}")))?;
        Ok(Self(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_index() {
        assert!(AccountId::new(1) < AccountId::new(2));
        assert_eq!(AccountId::from(7).index(), 7);
    }

    #[test]
    fn parses_from_decimal() {
        assert_eq!(" 42 ".parse::<AccountId>().unwrap(), AccountId::new(42));
        assert!(matches!(
            "-1".parse::<AccountId>(),
            Err(DomainError::InvalidId(_))
        ));
    }
}
