//! Workload configuration.
//!
//! Defaults reproduce the reference runs: 10 accounts of 1,000, transfers of
//! 1..=100, vectors of one million elements in -1000..=1000.

use std::time::Duration;

use lockstep_core::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// Concurrent transfer workload with a periodic consistency checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    pub accounts: usize,
    pub initial_balance: u64,
    /// Number of transfer worker threads.
    pub workers: usize,
    /// Transfers attempted by each worker.
    pub ops_per_worker: usize,
    pub min_amount: u64,
    pub max_amount: u64,
    /// Snapshot checks run by the checker thread while workers are active.
    pub checks: usize,
    pub check_interval: Duration,
    /// Base seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            accounts: 10,
            initial_balance: 1_000,
            workers: 4,
            ops_per_worker: 20_000,
            min_amount: 1,
            max_amount: 100,
            checks: 10,
            check_interval: Duration::from_millis(200),
            seed: None,
        }
    }
}

impl BankConfig {
    pub fn with_accounts(mut self, accounts: usize, initial_balance: u64) -> Self {
        self.accounts = accounts;
        self.initial_balance = initial_balance;
        self
    }

    pub fn with_workers(mut self, workers: usize, ops_per_worker: usize) -> Self {
        self.workers = workers;
        self.ops_per_worker = ops_per_worker;
        self
    }

    pub fn with_amounts(mut self, min_amount: u64, max_amount: u64) -> Self {
        self.min_amount = min_amount;
        self.max_amount = max_amount;
        self
    }

    pub fn with_checks(mut self, checks: usize, interval: Duration) -> Self {
        self.checks = checks;
        self.check_interval = interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.accounts < 2 {
            return Err(DomainError::validation(
                "at least 2 accounts are needed to pick distinct transfer pairs",
            ));
        }
        if self.workers == 0 {
            return Err(DomainError::validation("at least 1 worker is required"));
        }
        if self.min_amount > self.max_amount {
            return Err(DomainError::validation(format!(
                "min amount {} exceeds max amount {}",
                self.min_amount, self.max_amount
            )));
        }
        Ok(())
    }
}

/// Producer/consumer scalar product, repeated for each buffer capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub vector_len: usize,
    pub min_value: i64,
    pub max_value: i64,
    pub capacities: Vec<usize>,
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vector_len: 1_000_000,
            min_value: -1_000,
            max_value: 1_000,
            capacities: vec![10, 100, 1_000, 10_000, 100_000],
            seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_vector_len(mut self, len: usize) -> Self {
        self.vector_len = len;
        self
    }

    pub fn with_capacities(mut self, capacities: Vec<usize>) -> Self {
        self.capacities = capacities;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.capacities.is_empty() {
            return Err(DomainError::validation("at least one buffer capacity is required"));
        }
        if self.capacities.contains(&0) {
            return Err(DomainError::validation("buffer capacity must be at least 1"));
        }
        if self.min_value > self.max_value {
            return Err(DomainError::validation(format!(
                "min value {} exceeds max value {}",
                self.min_value, self.max_value
            )));
        }
        // Keep |x * y| * len comfortably inside i64.
        let bound = self.min_value.unsigned_abs().max(self.max_value.unsigned_abs()) as u128;
        let worst = (bound * bound).checked_mul(self.vector_len as u128);
        if worst.is_none_or(|worst| worst > i64::MAX as u128) {
            return Err(DomainError::validation(
                "value range and vector length could overflow the scalar product",
            ));
        }
        Ok(())
    }
}

/// Transfer throughput across a range of worker counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub thread_counts: Vec<usize>,
    pub accounts: usize,
    pub initial_balance: u64,
    pub ops_per_thread: usize,
    pub min_amount: u64,
    pub max_amount: u64,
    pub seed: Option<u64>,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            thread_counts: vec![1, 2, 4, 8, 16],
            accounts: 10,
            initial_balance: 1_000,
            ops_per_thread: 10_000,
            min_amount: 1,
            max_amount: 100,
            seed: None,
        }
    }
}

impl ScalingConfig {
    pub fn with_thread_counts(mut self, counts: Vec<usize>) -> Self {
        self.thread_counts = counts;
        self
    }

    pub fn with_ops_per_thread(mut self, ops: usize) -> Self {
        self.ops_per_thread = ops;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The bank workload for one row of the scaling table (no checker).
    pub fn bank_config(&self, threads: usize) -> BankConfig {
        BankConfig {
            accounts: self.accounts,
            initial_balance: self.initial_balance,
            workers: threads,
            ops_per_worker: self.ops_per_thread,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            checks: 0,
            check_interval: Duration::ZERO,
            seed: self.seed,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.thread_counts.is_empty() {
            return Err(DomainError::validation("at least one thread count is required"));
        }
        self.thread_counts
            .iter()
            .try_for_each(|&threads| self.bank_config(threads).validate())
    }
}
