//! Verify a simulator transcript against an expected-output artifact.
//!
//! Usage:
//!   verify <ACTUAL> <EXPECTED>           # both arguments are text
//!   verify --files <ACTUAL> <EXPECTED>   # both arguments are paths

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use tank_battle_harness::{verify_artifact, HarnessError};

#[derive(Debug, Parser)]
#[command(name = "verify")]
#[command(about = "Check simulator output against an expected transcript or VERIFY_<NAME> marker")]
struct Args {
    /// Actual simulator output
    actual: String,

    /// Expected output, or a single VERIFY_<NAME> marker line
    expected: String,

    /// Treat both arguments as file paths
    #[arg(long)]
    files: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let (actual, expected) = if args.files {
        match (fs::read_to_string(&args.actual), fs::read_to_string(&args.expected)) {
            (Ok(actual), Ok(expected)) => (actual, expected),
            (Err(err), _) | (_, Err(err)) => {
                eprintln!("Failed to read input: {err}");
                return ExitCode::from(2);
            }
        }
    } else {
        (args.actual, args.expected)
    };

    match verify_artifact(&actual, &expected) {
        Ok(report) if report.passed => {
            println!("Verification passed!");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            println!("Verification failed!");
            for error in &report.errors {
                println!("Error: {error}");
            }
            ExitCode::FAILURE
        }
        Err(err @ HarnessError::UnknownPredicate(_)) => {
            eprintln!("Configuration error: {err}");
            ExitCode::from(3)
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}
