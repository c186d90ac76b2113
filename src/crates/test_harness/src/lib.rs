//! Fixture generation and transcript verification for the tank battle simulator.
//!
//! The catalog renders scenario maps paired with expected outcomes; the verifier
//! checks simulator transcripts against those outcomes, either literally or
//! through a named predicate.
//!
//! Typical usage:
//! ```no_run
//! use tank_battle_harness::{
//!     run_fixture, Catalog, FixtureLayout, FixtureWriter, Simulator, SimulatorConfig,
//! };
//!
//! let catalog = Catalog::standard().expect("catalog should validate");
//! let writer = FixtureWriter::new(FixtureLayout::new("target/fixtures"));
//! let written = catalog.generate(&writer).expect("fixtures should be written");
//!
//! let simulator = Simulator::new(
//!     SimulatorConfig::new("/path/to/tanks_game").with_working_directory("target/fixtures"),
//! );
//! for (fixture, paths) in catalog.enumerate().iter().zip(&written) {
//!     let verdict = run_fixture(&simulator, fixture, paths).expect("simulator should run");
//!     println!("{}: {}", verdict.id, if verdict.passed() { "ok" } else { "FAILED" });
//! }
//! ```

mod binding;
mod catalog;
mod config;
mod error;
mod fixture;
mod harness;
mod outcome;
mod verify;

pub use binding::{write_algorithm_binding, Algorithm, AlgorithmBinding};
pub use catalog::{
    algorithm_comparison_fixtures, category_fixtures, content_edge_case_fixtures,
    dimension_mismatch_fixtures, file_system_fixtures, game_logic_fixtures,
    header_error_fixtures, Catalog, Manifest, ManifestEntry,
};
pub use config::{BindingDelivery, FixtureLayout, SimulatorConfig};
pub use error::{HarnessError, HarnessResult};
pub use fixture::{
    Category, Cell, FixtureWriter, Grid, HeaderKey, LineEnding, MapFixture, ScenarioHeader,
    WrittenFixture,
};
pub use harness::{
    run_fixture, run_fixtures, transcript_path_for, FixtureVerdict, LogLine, LogStream,
    Simulator, SimulatorRun,
};
pub use outcome::{ExpectedOutcome, Predicate, MARKER_PREFIX};
pub use verify::{
    verify, verify_artifact, Transcript, VerificationReport, FIRE_MARKER, PLAYER_ONE_WIN_PREFIX,
    SHELL_EXHAUSTION_LINE,
};
