use std::process::ExitCode;

use clap::Parser;
use lockstep_core::DomainError;
use lockstep_demo::cli::{Cli, Command};
use lockstep_demo::{bank, pipeline, scaling};
use serde::Serialize;

fn main() -> ExitCode {
    let cli = Cli::parse();
    lockstep_observability::init(cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let fatal = err
                .downcast_ref::<DomainError>()
                .is_some_and(DomainError::is_fatal);
            tracing::error!(error = %format!("{err:#}"), fatal, "run failed");
            if fatal {
                // Lost or created money: a correctness bug, not a bad input.
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Bank(args) => {
            let report = bank::run_bank(&args.into_config(cli.seed))?;
            emit(&report, json)
        }
        Command::Pipeline(args) if args.walkthrough => {
            let run = pipeline::walkthrough(2)?;
            if !run.correct {
                return Err(DomainError::invariant("walkthrough produced a wrong result").into());
            }
            emit_json_or(&run, json, || format!("Result: {}", run.result))
        }
        Command::Pipeline(args) => {
            let report = pipeline::run_pipeline(&args.into_config(cli.seed))?;
            emit(&report, json)?;
            if !report.all_correct() {
                return Err(DomainError::invariant("pipeline lost or reordered items").into());
            }
            Ok(())
        }
        Command::Scaling(args) => {
            let report = scaling::run_scaling(&args.into_config(cli.seed))?;
            emit(&report, json)
        }
    }
}

fn emit<R: Serialize + std::fmt::Display>(report: &R, json: bool) -> anyhow::Result<()> {
    emit_json_or(report, json, || report.to_string())
}

fn emit_json_or<R: Serialize>(
    report: &R,
    json: bool,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
