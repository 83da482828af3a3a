//! Transfer throughput as the number of worker threads grows.

use anyhow::Context;
use tracing::info;

use crate::bank::run_bank;
use crate::config::ScalingConfig;
use crate::report::{ScalingReport, ScalingRow, per_second};

/// Run the bank workload once per configured thread count.
///
/// Every row comes from a run whose final total matched its initial total; a
/// run that loses or creates money aborts the whole sweep with the underlying
/// invariant violation.
pub fn run_scaling(config: &ScalingConfig) -> anyhow::Result<ScalingReport> {
    config.validate()?;

    let mut rows = Vec::with_capacity(config.thread_counts.len());
    for &threads in &config.thread_counts {
        let report = run_bank(&config.bank_config(threads))
            .with_context(|| format!("scaling run with {threads} threads failed"))?;

        let row = ScalingRow {
            threads,
            operations: report.transfers_attempted,
            elapsed_secs: report.elapsed_secs,
            throughput: per_second(report.transfers_attempted, report.elapsed_secs),
        };
        info!(
            threads,
            throughput = row.throughput,
            final_total = report.final_total,
            "scaling run finished"
        );
        rows.push(row);
    }

    Ok(ScalingReport {
        accounts: config.accounts,
        ops_per_thread: config.ops_per_thread,
        rows,
    })
}
