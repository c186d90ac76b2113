//! Generate the catalog, run every fixture through a simulator binary and
//! verify the transcripts.
//!
//! Usage:
//!   run_catalog --simulator build/tanks_game
//!   run_catalog --simulator build/tanks_game --binding-delivery file --json

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tank_battle_harness::{
    run_fixtures, BindingDelivery, Catalog, FixtureLayout, FixtureWriter, Simulator,
    SimulatorConfig,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Delivery {
    /// Pass --algorithmN=<id> arguments
    Cli,
    /// Rewrite the shared algorithm_types.txt
    File,
    /// Do both
    Both,
}

impl From<Delivery> for BindingDelivery {
    fn from(value: Delivery) -> Self {
        match value {
            Delivery::Cli => BindingDelivery::CliArgs,
            Delivery::File => BindingDelivery::SharedFile,
            Delivery::Both => BindingDelivery::Both,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "run_catalog")]
#[command(about = "Run every catalog fixture through the tank simulator and verify its output")]
struct Args {
    /// Simulator binary to execute
    #[arg(long)]
    simulator: PathBuf,

    /// Directory receiving generated fixtures
    #[arg(long, default_value = "test")]
    root: PathBuf,

    /// Working directory for the simulator (defaults to the fixture root)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Seconds before a single run is killed
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = Delivery::Both)]
    binding_delivery: Delivery,

    /// Print verdicts as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let catalog = Catalog::standard()?;
    let writer = FixtureWriter::new(FixtureLayout::new(&args.root));
    let written = catalog.generate(&writer)?;

    // The child runs in another directory, so resolve the binary up front.
    let binary = fs::canonicalize(&args.simulator)?;
    let work_dir = args.work_dir.clone().unwrap_or_else(|| args.root.clone());
    let simulator = Simulator::new(
        SimulatorConfig::new(binary)
            .with_working_directory(work_dir)
            .with_binding_delivery(args.binding_delivery.into())
            .with_timeout(Duration::from_secs(args.timeout_secs)),
    );

    let verdicts = run_fixtures(&simulator, catalog.enumerate(), &written)?;

    let failed = verdicts.iter().filter(|verdict| !verdict.passed()).count();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdicts)?);
    } else {
        for verdict in &verdicts {
            if verdict.passed() {
                println!("  PASS  {}", verdict.id);
            } else {
                println!("  FAIL  {}", verdict.id);
                for error in &verdict.report.errors {
                    println!("        Error: {error}");
                }
            }
        }
        println!("\n{} passed, {failed} failed", verdicts.len() - failed);
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
