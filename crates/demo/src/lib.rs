//! Workload harnesses for the lockstep primitives.
//!
//! These are external callers of the buffer and ledger: they start threads,
//! join them, and report what they observed. The `lockstep` binary wires them
//! to the command line.

pub mod bank;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod scaling;

mod rng;

pub use config::{BankConfig, PipelineConfig, ScalingConfig};
pub use report::{BankReport, PipelineReport, PipelineRun, ScalingReport, ScalingRow};
