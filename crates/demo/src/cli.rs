//! Command-line surface of the `lockstep` binary.
//!
//! Every option can also be set through a `LOCKSTEP_*` environment variable.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use lockstep_observability::LogFormat;

use crate::config::{BankConfig, PipelineConfig, ScalingConfig};

#[derive(Parser, Debug)]
#[command(name = "lockstep", version, about = "Bounded-buffer and ledger concurrency workloads", long_about = None)]
pub struct Cli {
    /// Log encoding on stderr (`json` or `text`).
    #[arg(long, global = true, env = "LOCKSTEP_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Print the final report as JSON on stdout.
    #[arg(long, global = true, env = "LOCKSTEP_JSON")]
    pub json: bool,

    /// Base seed for reproducible workloads.
    #[arg(long, global = true, env = "LOCKSTEP_SEED")]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Concurrent random transfers with periodic consistency checks.
    Bank(BankArgs),
    /// Producer/consumer scalar product across buffer capacities.
    Pipeline(PipelineArgs),
    /// Transfer throughput across worker thread counts.
    Scaling(ScalingArgs),
}

#[derive(Args, Debug)]
pub struct BankArgs {
    #[arg(long, env = "LOCKSTEP_ACCOUNTS", default_value_t = 10)]
    pub accounts: usize,

    #[arg(long, env = "LOCKSTEP_INITIAL_BALANCE", default_value_t = 1_000)]
    pub initial_balance: u64,

    #[arg(long, env = "LOCKSTEP_WORKERS", default_value_t = 4)]
    pub workers: usize,

    #[arg(long, env = "LOCKSTEP_OPS_PER_WORKER", default_value_t = 20_000)]
    pub ops_per_worker: usize,

    #[arg(long, env = "LOCKSTEP_MIN_AMOUNT", default_value_t = 1)]
    pub min_amount: u64,

    #[arg(long, env = "LOCKSTEP_MAX_AMOUNT", default_value_t = 100)]
    pub max_amount: u64,

    /// Consistency checks taken while the workers run.
    #[arg(long, env = "LOCKSTEP_CHECKS", default_value_t = 10)]
    pub checks: usize,

    #[arg(long, env = "LOCKSTEP_CHECK_INTERVAL_MS", default_value_t = 200)]
    pub check_interval_ms: u64,
}

impl BankArgs {
    pub fn into_config(self, seed: Option<u64>) -> BankConfig {
        BankConfig {
            accounts: self.accounts,
            initial_balance: self.initial_balance,
            workers: self.workers,
            ops_per_worker: self.ops_per_worker,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            checks: self.checks,
            check_interval: Duration::from_millis(self.check_interval_ms),
            seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct PipelineArgs {
    #[arg(long, env = "LOCKSTEP_VECTOR_LEN", default_value_t = 1_000_000)]
    pub vector_len: usize,

    #[arg(long, env = "LOCKSTEP_MIN_VALUE", default_value_t = -1_000, allow_hyphen_values = true)]
    pub min_value: i64,

    #[arg(long, env = "LOCKSTEP_MAX_VALUE", default_value_t = 1_000, allow_hyphen_values = true)]
    pub max_value: i64,

    /// Buffer capacities to compare, comma separated.
    #[arg(
        long,
        env = "LOCKSTEP_CAPACITIES",
        value_delimiter = ',',
        default_values_t = [10usize, 100, 1_000, 10_000, 100_000]
    )]
    pub capacities: Vec<usize>,

    /// Run the small logged example (5-element vectors, capacity 2) instead.
    #[arg(long)]
    pub walkthrough: bool,
}

impl PipelineArgs {
    pub fn into_config(self, seed: Option<u64>) -> PipelineConfig {
        PipelineConfig {
            vector_len: self.vector_len,
            min_value: self.min_value,
            max_value: self.max_value,
            capacities: self.capacities,
            seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct ScalingArgs {
    /// Worker thread counts to compare, comma separated.
    #[arg(
        long,
        env = "LOCKSTEP_THREAD_COUNTS",
        value_delimiter = ',',
        default_values_t = [1usize, 2, 4, 8, 16]
    )]
    pub threads: Vec<usize>,

    #[arg(long, env = "LOCKSTEP_ACCOUNTS", default_value_t = 10)]
    pub accounts: usize,

    #[arg(long, env = "LOCKSTEP_INITIAL_BALANCE", default_value_t = 1_000)]
    pub initial_balance: u64,

    #[arg(long, env = "LOCKSTEP_OPS_PER_THREAD", default_value_t = 10_000)]
    pub ops_per_thread: usize,

    #[arg(long, env = "LOCKSTEP_MIN_AMOUNT", default_value_t = 1)]
    pub min_amount: u64,

    #[arg(long, env = "LOCKSTEP_MAX_AMOUNT", default_value_t = 100)]
    pub max_amount: u64,
}

impl ScalingArgs {
    pub fn into_config(self, seed: Option<u64>) -> ScalingConfig {
        ScalingConfig {
            thread_counts: self.threads,
            accounts: self.accounts,
            initial_balance: self.initial_balance,
            ops_per_thread: self.ops_per_thread,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            seed,
        }
    }
}
