//! Bank workload: random transfers from several workers while a checker
//! thread takes consistency snapshots.

use std::ops::AddAssign;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use lockstep_core::{AccountId, DomainError};
use lockstep_ledger::Ledger;
use rand::Rng;
use tracing::{debug, info};

use crate::config::BankConfig;
use crate::report::BankReport;
use crate::rng::thread_rng_for;

/// Outcome counts of one or more transfer workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferTally {
    pub attempted: u64,
    pub succeeded: u64,
    pub refused: u64,
}

impl AddAssign for TransferTally {
    fn add_assign(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.refused += other.refused;
    }
}

/// Perform `ops` random transfers between distinct accounts, with amounts
/// uniform in `min_amount..=max_amount`.
///
/// A ledger with fewer than two accounts has no distinct pair to pick, so
/// nothing is attempted.
pub fn random_transfers<R: Rng>(
    ledger: &Ledger,
    ops: usize,
    min_amount: u64,
    max_amount: u64,
    rng: &mut R,
) -> TransferTally {
    let n = ledger.num_accounts();
    let mut tally = TransferTally::default();
    if n < 2 {
        debug!(accounts = n, "no distinct account pair; skipping transfers");
        return tally;
    }

    for _ in 0..ops {
        let from = rng.gen_range(0..n);
        let to = (from + rng.gen_range(1..n)) % n;
        let amount = rng.gen_range(min_amount..=max_amount);

        tally.attempted += 1;
        if ledger.transfer(AccountId::new(from), AccountId::new(to), amount) {
            tally.succeeded += 1;
        } else {
            tally.refused += 1;
        }
    }
    tally
}

/// Run the full workload described by `config`.
///
/// Any failed consistency check is returned as
/// [`DomainError::InvariantViolation`]; it is never retried.
pub fn run_bank(config: &BankConfig) -> anyhow::Result<BankReport> {
    config.validate()?;

    let ledger = Arc::new(
        Ledger::new(config.accounts, config.initial_balance).map_err(DomainError::from)?,
    );
    info!(
        accounts = config.accounts,
        expected_total = ledger.initial_total(),
        "ledger ready"
    );
    ledger.verify_consistency().map_err(DomainError::from)?;

    let checker = {
        let ledger = Arc::clone(&ledger);
        let (checks, interval) = (config.checks, config.check_interval);
        thread::Builder::new()
            .name("consistency-checker".to_string())
            .spawn(move || check_periodically(&ledger, checks, interval))
            .context("failed to spawn consistency checker")?
    };

    let started = Instant::now();
    let workers = (0..config.workers)
        .map(|index| {
            let ledger = Arc::clone(&ledger);
            let config = config.clone();
            thread::Builder::new()
                .name(format!("transfer-{index}"))
                .spawn(move || {
                    let mut rng = thread_rng_for(config.seed, index as u64);
                    let tally = random_transfers(
                        &ledger,
                        config.ops_per_worker,
                        config.min_amount,
                        config.max_amount,
                        &mut rng,
                    );
                    debug!(worker = index, ?tally, "transfer worker finished");
                    tally
                })
                .with_context(|| format!("failed to spawn transfer worker {index}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut tally = TransferTally::default();
    for worker in workers {
        tally += join(worker)?;
    }
    let elapsed = started.elapsed();

    let checks = join(checker)?;
    if checks.failed > 0 {
        return Err(DomainError::invariant(format!(
            "{} of {} consistency checks failed",
            checks.failed,
            checks.passed + checks.failed
        ))
        .into());
    }

    let final_total = ledger.verify_consistency().map_err(DomainError::from)?;
    let balances = ledger.snapshot().balances;
    info!(
        final_total,
        succeeded = tally.succeeded,
        refused = tally.refused,
        elapsed_ms = elapsed.as_millis() as u64,
        "bank workload finished"
    );

    Ok(BankReport {
        accounts: config.accounts,
        workers: config.workers,
        initial_total: ledger.initial_total(),
        final_total,
        balances,
        transfers_attempted: tally.attempted,
        transfers_succeeded: tally.succeeded,
        transfers_refused: tally.refused,
        checks_passed: checks.passed,
        elapsed_secs: elapsed.as_secs_f64(),
    })
}

#[derive(Debug, Default, Clone, Copy)]
struct CheckTally {
    passed: u64,
    failed: u64,
}

fn check_periodically(ledger: &Ledger, checks: usize, interval: Duration) -> CheckTally {
    let mut tally = CheckTally::default();
    for _ in 0..checks {
        thread::sleep(interval);
        match ledger.verify_consistency() {
            Ok(total) => {
                tally.passed += 1;
                info!(total, "consistency check passed");
            }
            // Already logged at error level by the ledger.
            Err(_) => tally.failed += 1,
        }
    }
    tally
}

pub(crate) fn join<T>(handle: JoinHandle<T>) -> anyhow::Result<T> {
    let name = handle
        .thread()
        .name()
        .unwrap_or("unnamed")
        .to_string();
    handle
        .join()
        .map_err(|_| anyhow!("thread `{name}` panicked"))
}
