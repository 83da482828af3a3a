//! Account: a passive balance record.
//!
//! Accounts are only mutated by the owning [`Ledger`](crate::Ledger) while it
//! holds the account's lock; outside the crate they are read-only.

use lockstep_core::{AccountId, Entity};

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    balance: u64,
}

impl Account {
    pub fn new(id: AccountId, balance: u64) -> Self {
        Self { id, balance }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// The ledger validates at construction that the sum of all balances fits
    /// in `u64`, so a credit can never overflow.
    pub(crate) fn deposit(&mut self, amount: u64) {
        self.balance += amount;
    }

    /// Debit `amount`, refusing (without change) if it would go negative.
    pub(crate) fn withdraw(&mut self, amount: u64) -> Result<(), LedgerError> {
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                Ok(())
            }
            None => Err(LedgerError::InsufficientFunds {
                id: self.id,
                balance: self.balance,
                requested: amount,
            }),
        }
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_refuses_overdraft_without_change() {
        let mut account = Account::new(AccountId::new(3), 40);
        let err = account.withdraw(41).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                id: AccountId::new(3),
                balance: 40,
                requested: 41,
            }
        );
        assert_eq!(account.balance(), 40);

        account.withdraw(40).unwrap();
        assert_eq!(account.balance(), 0);
    }

    #[test]
    fn deposit_adds_to_balance() {
        let mut account = Account::new(AccountId::new(0), 5);
        account.deposit(7);
        assert_eq!(account.balance(), 12);
        assert_eq!(account.id(), AccountId::new(0));
    }
}
