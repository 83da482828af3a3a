//! Lock ordering for multi-account operations.
//!
//! ## The rule
//!
//! Account locks are always acquired in ascending [`AccountId`] order: the
//! lower id's lock first, regardless of which account is debited.
//!
//! Any two operations that need an overlapping set of accounts then request
//! the shared locks in the same relative order, so no cycle of waiting threads
//! can form. Every operation that holds more than one account lock at a time
//! must acquire them through this module. Locks may be released in any order.
//!
//! [`AccountId`]: lockstep_core::AccountId

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::account::Account;

pub(crate) type Slot = Mutex<Account>;

/// The order in which the locks of accounts `a` and `b` are taken.
pub(crate) fn acquisition_order(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Lock one account.
pub(crate) fn lock(slot: &Slot) -> MutexGuard<'_, Account> {
    // No user code runs under an account lock and a balance is only written
    // after its check passed, so a poisoned guard still holds a valid record.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lock two distinct accounts, lower index first.
///
/// The guards are returned in argument order: `(guard_of_a, guard_of_b)`.
pub(crate) fn lock_pair(
    slots: &[Slot],
    a: usize,
    b: usize,
) -> (MutexGuard<'_, Account>, MutexGuard<'_, Account>) {
    debug_assert_ne!(a, b, "lock_pair needs two distinct accounts");

    let (first, second) = acquisition_order(a, b);
    let first_guard = lock(&slots[first]);
    let second_guard = lock(&slots[second]);

    if first == a {
        (first_guard, second_guard)
    } else {
        (second_guard, first_guard)
    }
}

/// Lock every account, in ascending index order.
pub(crate) fn lock_all(slots: &[Slot]) -> Vec<MutexGuard<'_, Account>> {
    slots.iter().map(lock).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_core::{AccountId, Entity};

    fn slots(n: usize) -> Vec<Slot> {
        (0..n)
            .map(|i| Mutex::new(Account::new(AccountId::new(i), i as u64 * 10)))
            .collect()
    }

    #[test]
    fn lower_index_is_always_locked_first() {
        assert_eq!(acquisition_order(2, 7), (2, 7));
        assert_eq!(acquisition_order(7, 2), (2, 7));
    }

    #[test]
    fn pair_guards_follow_argument_order() {
        let slots = slots(4);

        let (a, b) = lock_pair(&slots, 3, 1);
        assert_eq!(a.id(), AccountId::new(3));
        assert_eq!(b.id(), AccountId::new(1));
        drop((a, b));

        let (a, b) = lock_pair(&slots, 0, 2);
        assert_eq!(a.id(), AccountId::new(0));
        assert_eq!(b.id(), AccountId::new(2));
    }

    #[test]
    fn lock_all_holds_every_account_in_id_order() {
        let slots = slots(5);
        let guards = lock_all(&slots);
        let ids: Vec<usize> = guards.iter().map(|g| g.id().index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(slots.iter().all(|s| s.try_lock().is_err()));
    }
}
