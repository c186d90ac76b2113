//! Write the fixture catalog to disk.
//!
//! Usage:
//!   generate_fixtures                      # writes under ./test
//!   generate_fixtures --root out/fixtures
//!   generate_fixtures --list               # print fixture ids only

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tank_battle_harness::{Catalog, FixtureLayout, FixtureWriter};

#[derive(Debug, Parser)]
#[command(name = "generate_fixtures")]
#[command(about = "Generate tank simulator map fixtures and expected outputs")]
struct Args {
    /// Directory receiving maps/, expected_outputs/ and manifest.json
    #[arg(long, default_value = "test")]
    root: PathBuf,

    /// Where to write the shared algorithm binding (defaults to <root>/algorithm_types.txt)
    #[arg(long)]
    binding_path: Option<PathBuf>,

    /// List fixture ids and expected outcomes without writing anything
    #[arg(long)]
    list: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let catalog = Catalog::standard()?;

    if args.list {
        for fixture in catalog.enumerate() {
            println!(
                "{:<40} [{}] {}",
                fixture.id(),
                fixture.binding,
                fixture.expected.render_artifact().trim_end()
            );
        }
        return Ok(());
    }

    let mut layout = FixtureLayout::new(&args.root);
    if let Some(path) = args.binding_path {
        layout = layout.with_binding_path(path);
    }
    let writer = FixtureWriter::new(layout);
    let written = catalog.generate(&writer)?;

    println!(
        "Generated {} test cases under {}",
        written.len(),
        args.root.display()
    );
    Ok(())
}
