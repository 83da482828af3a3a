//! Run reports: serializable for `--json`, `Display` for terminals.

use core::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankReport {
    pub accounts: usize,
    pub workers: usize,
    pub initial_total: u64,
    pub final_total: u64,
    pub balances: Vec<u64>,
    pub transfers_attempted: u64,
    pub transfers_succeeded: u64,
    pub transfers_refused: u64,
    pub checks_passed: u64,
    pub elapsed_secs: f64,
}

impl BankReport {
    pub fn throughput(&self) -> f64 {
        per_second(self.transfers_attempted, self.elapsed_secs)
    }
}

impl fmt::Display for BankReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accounts:            {}", self.accounts)?;
        writeln!(f, "Workers:             {}", self.workers)?;
        writeln!(f, "Expected total:      {}", self.initial_total)?;
        writeln!(f, "Final total:         {}", self.final_total)?;
        writeln!(
            f,
            "Transfers:           {} attempted, {} succeeded, {} refused",
            self.transfers_attempted, self.transfers_succeeded, self.transfers_refused
        )?;
        writeln!(f, "Consistency checks:  {} passed", self.checks_passed)?;
        writeln!(
            f,
            "Elapsed:             {:.4}s ({:.2} ops/sec)",
            self.elapsed_secs,
            self.throughput()
        )?;
        writeln!(f)?;
        writeln!(f, "Balances:")?;
        for (id, balance) in self.balances.iter().enumerate() {
            writeln!(f, "  account {id:>3}: {balance}")?;
        }
        Ok(())
    }
}

/// One producer/consumer run at a single buffer capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    pub capacity: usize,
    pub result: i64,
    pub correct: bool,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub vector_len: usize,
    pub expected: i64,
    pub runs: Vec<PipelineRun>,
}

impl PipelineReport {
    pub fn all_correct(&self) -> bool {
        self.runs.iter().all(|run| run.correct)
    }

    pub fn fastest(&self) -> Option<&PipelineRun> {
        self.runs
            .iter()
            .min_by(|a, b| a.elapsed_secs.total_cmp(&b.elapsed_secs))
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vector size:     {}", self.vector_len)?;
        writeln!(f, "Expected result: {}", self.expected)?;
        writeln!(f)?;
        for run in &self.runs {
            writeln!(
                f,
                "Capacity: {:>6} | Time: {:.4}s | Result: {} {}",
                run.capacity,
                run.elapsed_secs,
                run.result,
                if run.correct { "[OK]" } else { "[FAIL]" }
            )?;
        }

        if let Some(fastest) = self.fastest() {
            writeln!(f)?;
            writeln!(
                f,
                "Fastest: capacity {} ({:.4}s)",
                fastest.capacity, fastest.elapsed_secs
            )?;
            for run in &self.runs {
                writeln!(
                    f,
                    "  capacity {:>6}: {:.2}x of fastest",
                    run.capacity,
                    ratio(run.elapsed_secs, fastest.elapsed_secs)
                )?;
            }
        }

        if self.all_correct() {
            writeln!(f, "[OK] All results are correct")
        } else {
            writeln!(f, "[FAIL] Some results are incorrect")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingRow {
    pub threads: usize,
    pub operations: u64,
    pub elapsed_secs: f64,
    pub throughput: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingReport {
    pub accounts: usize,
    pub ops_per_thread: usize,
    pub rows: Vec<ScalingRow>,
}

impl fmt::Display for ScalingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accounts: {}", self.accounts)?;
        writeln!(f, "Operations per thread: {}", self.ops_per_thread)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<10} {:<12} {:<20} {:<8}",
            "Threads", "Time (s)", "Throughput (ops/s)", "Speedup"
        )?;
        writeln!(f, "{}", "-".repeat(53))?;

        let baseline = self.rows.first().map(|row| row.elapsed_secs);
        for row in &self.rows {
            let speedup = baseline.map_or(1.0, |base| ratio(base, row.elapsed_secs));
            writeln!(
                f,
                "{:<10} {:<12.4} {:<20.2} {:<8.2}",
                row.threads,
                row.elapsed_secs,
                row.throughput,
                speedup
            )?;
        }
        Ok(())
    }
}

pub(crate) fn per_second(count: u64, secs: f64) -> f64 {
    if secs > 0.0 { count as f64 / secs } else { 0.0 }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 { numerator / denominator } else { 1.0 }
}
