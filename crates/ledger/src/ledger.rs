//! Ledger: a fixed set of independently locked accounts.
//!
//! ## Invariants
//!
//! - Accounts are created once, at construction, and never added or removed.
//! - Whenever no transfer is in flight, the sum of all balances equals
//!   [`Ledger::initial_total`].
//! - No balance is ever negative (balances are `u64` and a debit that would
//!   underflow is refused before anything is written).
//!
//! ## Concurrency
//!
//! `Ledger` is `Sync`; share it with `Arc<Ledger>`. Single-account reads take
//! one lock. Transfers take two, snapshots take all of them, always in
//! ascending id order (see the `ordering` module). Waits are ordinary lock
//! contention; nothing blocks on anything else.

use std::sync::Mutex;

use lockstep_core::AccountId;
use serde::Serialize;
use tracing::{error, trace};

use crate::account::Account;
use crate::error::LedgerError;
use crate::ordering::{self, Slot};

/// Point-in-time view of every balance, read under all account locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    /// Balance per account, indexed by account id.
    pub balances: Vec<u64>,
    /// Sum of `balances`.
    pub total: u64,
}

#[derive(Debug)]
pub struct Ledger {
    accounts: Vec<Slot>,
    initial_total: u64,
}

impl Ledger {
    /// `num_accounts` accounts, each starting with `initial_balance_per_account`.
    pub fn new(num_accounts: usize, initial_balance_per_account: u64) -> Result<Self, LedgerError> {
        Self::with_balances(vec![initial_balance_per_account; num_accounts])
    }

    /// One account per entry of `balances`; account `i` starts at `balances[i]`.
    ///
    /// Fails with [`LedgerError::TotalOverflow`] if the starting balances do not
    /// sum within `u64`.
    pub fn with_balances(balances: Vec<u64>) -> Result<Self, LedgerError> {
        let initial_total = balances
            .iter()
            .try_fold(0u64, |acc, b| acc.checked_add(*b))
            .ok_or(LedgerError::TotalOverflow)?;

        let accounts = balances
            .into_iter()
            .enumerate()
            .map(|(i, balance)| Mutex::new(Account::new(AccountId::new(i), balance)))
            .collect();

        Ok(Self {
            accounts,
            initial_total,
        })
    }

    pub fn num_accounts(&self) -> usize {
        self.accounts.len()
    }

    /// Sum of all starting balances. Fixed for the ledger's lifetime.
    pub fn initial_total(&self) -> u64 {
        self.initial_total
    }

    /// Current balance of one account. Takes only that account's lock.
    pub fn balance(&self, id: AccountId) -> Result<u64, LedgerError> {
        let slot = self.slot(id)?;
        Ok(ordering::lock(slot).balance())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Refused, with no lock taken, for a self-transfer or an unknown id.
    /// Refused, with no balance changed, if `from` holds less than `amount`.
    pub fn try_transfer(&self, from: AccountId, to: AccountId, amount: u64) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::SelfTransfer(from));
        }
        self.slot(from)?;
        self.slot(to)?;

        let (mut source, mut target) = ordering::lock_pair(&self.accounts, from.index(), to.index());
        if let Err(err) = source.withdraw(amount) {
            trace!(%from, %to, amount, "transfer refused: insufficient funds");
            return Err(err);
        }
        target.deposit(amount);

        trace!(%from, %to, amount, "transfer applied");
        Ok(())
    }

    /// Boolean form of [`try_transfer`](Self::try_transfer).
    pub fn transfer(&self, from: AccountId, to: AccountId, amount: u64) -> bool {
        self.try_transfer(from, to, amount).is_ok()
    }

    /// Sum of all balances, read while holding every account lock.
    ///
    /// The result is consistent with some serialization of all transfers
    /// completed or in progress at call time; it is never a torn read.
    pub fn total_balance(&self) -> u64 {
        ordering::lock_all(&self.accounts)
            .iter()
            .map(|account| account.balance())
            .sum()
    }

    /// Every balance at one consistent instant.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let guards = ordering::lock_all(&self.accounts);
        let balances: Vec<u64> = guards.iter().map(|account| account.balance()).collect();
        drop(guards);

        let total = balances.iter().sum();
        LedgerSnapshot { balances, total }
    }

    /// `true` iff the current total equals the initial total.
    ///
    /// `false` means money was lost or created: a locking bug, not a
    /// transient condition.
    pub fn consistency_check(&self) -> bool {
        self.total_balance() == self.initial_total
    }

    /// Typed form of [`consistency_check`](Self::consistency_check). Returns
    /// the verified total.
    pub fn verify_consistency(&self) -> Result<u64, LedgerError> {
        let actual = self.total_balance();
        if actual != self.initial_total {
            error!(
                expected = self.initial_total,
                actual, "ledger invariant violated: total balance drifted"
            );
            return Err(LedgerError::InvariantViolation {
                expected: self.initial_total,
                actual,
            });
        }
        Ok(actual)
    }

    fn slot(&self, id: AccountId) -> Result<&Slot, LedgerError> {
        self.accounts
            .get(id.index())
            .ok_or(LedgerError::AccountOutOfRange {
                id,
                len: self.accounts.len(),
            })
    }
}
