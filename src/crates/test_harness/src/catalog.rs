//! Fixed scenario catalog.
//!
//! Each category is a pure function over literal scenario data, so regenerating
//! the catalog always produces byte-identical files.

use std::collections::HashSet;

use log::info;
use serde::{Deserialize, Serialize};

use crate::binding::{write_algorithm_binding, Algorithm, AlgorithmBinding};
use crate::error::{HarnessError, HarnessResult};
use crate::fixture::{
    write_file, Category, FixtureWriter, Grid, HeaderKey, LineEnding, MapFixture, ScenarioHeader,
    WrittenFixture,
};
use crate::outcome::{ExpectedOutcome, Predicate};

const TITLE: &str = "Test Map";

/// Ordered, validated collection of fixtures.
#[derive(Debug, Clone)]
pub struct Catalog {
    fixtures: Vec<MapFixture>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate fixture ids and fixtures whose
    /// expected-output artifacts would overwrite each other.
    pub fn new(fixtures: Vec<MapFixture>) -> HarnessResult<Self> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for fixture in &fixtures {
            if !ids.insert(fixture.id()) {
                return Err(HarnessError::DuplicateFixture(fixture.id()));
            }
            // Expected outputs share one flat directory keyed by name.
            if !names.insert(fixture.name.as_str()) {
                return Err(HarnessError::DuplicateFixture(format!(
                    "{} (expected output name collides)",
                    fixture.id()
                )));
            }
        }
        Ok(Self { fixtures })
    }

    /// Every built-in category, in generation order.
    pub fn standard() -> HarnessResult<Self> {
        let fixtures = Category::ALL
            .into_iter()
            .flat_map(category_fixtures)
            .collect();
        Self::new(fixtures)
    }

    pub fn enumerate(&self) -> &[MapFixture] {
        &self.fixtures
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &MapFixture> + '_ {
        self.fixtures
            .iter()
            .filter(move |fixture| fixture.category == category)
    }

    pub fn find(&self, category: Category, name: &str) -> Option<&MapFixture> {
        self.fixtures
            .iter()
            .find(|fixture| fixture.category == category && fixture.name == name)
    }

    /// Indices at which the shared binding artifact must be rewritten, with the
    /// binding to write. The first fixture always starts a new binding.
    pub fn binding_schedule(&self) -> Vec<(usize, &AlgorithmBinding)> {
        let mut schedule: Vec<(usize, &AlgorithmBinding)> = Vec::new();
        for (index, fixture) in self.fixtures.iter().enumerate() {
            let changed = schedule
                .last()
                .map_or(true, |(_, current)| **current != fixture.binding);
            if changed {
                schedule.push((index, &fixture.binding));
            }
        }
        schedule
    }

    /// Write every fixture, the shared binding artifact and the manifest.
    ///
    /// The binding artifact is rewritten right before the first fixture whose
    /// binding differs from the previous one, so it ends up holding the binding
    /// of the last group in catalog order.
    pub fn generate(&self, writer: &FixtureWriter) -> HarnessResult<Vec<WrittenFixture>> {
        let schedule = self.binding_schedule();
        let mut next_switch = schedule.iter().peekable();
        let mut written = Vec::with_capacity(self.fixtures.len());
        let mut current_category = None;

        for (index, fixture) in self.fixtures.iter().enumerate() {
            if let Some((_, binding)) = next_switch.next_if(|(at, _)| *at == index) {
                info!("binding switch before {}: [{binding}]", fixture.id());
                write_algorithm_binding(&writer.layout().binding_path, binding)?;
            }
            if current_category != Some(fixture.category) {
                info!("generating {} fixtures", fixture.category);
                current_category = Some(fixture.category);
            }
            written.push(writer.write_fixture(fixture)?);
        }

        let manifest = self.manifest(writer);
        let json = serde_json::to_string_pretty(&manifest)?;
        write_file(&writer.layout().manifest_path, &format!("{json}\n"))?;
        info!(
            "generated {} fixtures under {}",
            written.len(),
            writer.layout().root.display()
        );
        Ok(written)
    }

    pub fn manifest(&self, writer: &FixtureWriter) -> Manifest {
        let entries = self
            .fixtures
            .iter()
            .map(|fixture| ManifestEntry {
                id: fixture.id(),
                category: fixture.category,
                name: fixture.name.clone(),
                paths: writer.paths_for(fixture),
                binding: fixture.binding.clone(),
                expected: fixture.expected.clone(),
            })
            .collect();
        Manifest { fixtures: entries }
    }
}

/// JSON index of a generated catalog for external runners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub fixtures: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub category: Category,
    pub name: String,
    #[serde(flatten)]
    pub paths: WrittenFixture,
    pub binding: AlgorithmBinding,
    pub expected: ExpectedOutcome,
}

pub fn category_fixtures(category: Category) -> Vec<MapFixture> {
    match category {
        Category::FileSystem => file_system_fixtures(),
        Category::HeaderErrors => header_error_fixtures(),
        Category::DimensionMismatches => dimension_mismatch_fixtures(),
        Category::ContentEdgeCases => content_edge_case_fixtures(),
        Category::GameLogic => game_logic_fixtures(),
        Category::AlgorithmComparison => algorithm_comparison_fixtures(),
    }
}

fn player_one_wins(tanks: usize) -> ExpectedOutcome {
    ExpectedOutcome::literal(format!("Player 1 won with {tanks} tanks still alive\n"))
}

fn parse_error(message: &str) -> ExpectedOutcome {
    ExpectedOutcome::literal(format!("Error parsing input file: {message}\n"))
}

fn two_a_side() -> Grid {
    Grid::new(["1 1", "   ", "2 2"])
}

pub fn file_system_fixtures() -> Vec<MapFixture> {
    vec![
        MapFixture::raw(
            Category::FileSystem,
            "empty_map",
            "",
            parse_error("Empty map file"),
        ),
        MapFixture::new(
            Category::FileSystem,
            "crlf_map",
            ScenarioHeader::standard(TITLE, 100, 5, 3, 3),
            two_a_side(),
            player_one_wins(2),
        )
        .with_line_ending(LineEnding::Crlf),
    ]
}

pub fn header_error_fixtures() -> Vec<MapFixture> {
    let base = ScenarioHeader::standard(TITLE, 100, 5, 3, 3);
    // The simulator reads four header lines positionally; a missing key pulls
    // the blank separator in as a parameter line.
    let missing_format = parse_error("Invalid parameter format: ");

    vec![
        MapFixture::new(
            Category::HeaderErrors,
            "missing_maxsteps",
            base.clone().without(HeaderKey::MaxSteps),
            two_a_side(),
            missing_format.clone(),
        ),
        MapFixture::new(
            Category::HeaderErrors,
            "missing_numshells",
            base.without(HeaderKey::NumShells),
            two_a_side(),
            missing_format,
        ),
        MapFixture::new(
            Category::HeaderErrors,
            "invalid_values",
            ScenarioHeader::new(TITLE)
                .with(HeaderKey::MaxSteps, "abc")
                .with(HeaderKey::NumShells, 5)
                .with(HeaderKey::Rows, "-1")
                .with(HeaderKey::Cols, "3.14"),
            two_a_side(),
            parse_error("Invalid value in parameter: MaxSteps = abc"),
        ),
    ]
}

pub fn dimension_mismatch_fixtures() -> Vec<MapFixture> {
    vec![
        MapFixture::new(
            Category::DimensionMismatches,
            "fewer_rows",
            ScenarioHeader::standard(TITLE, 100, 5, 5, 3),
            Grid::new(["1 1", "   "]),
            player_one_wins(2),
        ),
        MapFixture::new(
            Category::DimensionMismatches,
            "more_rows",
            ScenarioHeader::standard(TITLE, 100, 5, 2, 3),
            Grid::new(["1 1", "   ", "2 2", "Extra", "Extra"]),
            player_one_wins(2),
        ),
    ]
}

pub fn content_edge_case_fixtures() -> Vec<MapFixture> {
    vec![
        MapFixture::new(
            Category::ContentEdgeCases,
            "no_tanks",
            ScenarioHeader::standard(TITLE, 100, 5, 3, 3),
            Grid::new(["   ", "   ", "   "]),
            ExpectedOutcome::literal("Tie, both players have zero tanks\n"),
        ),
        MapFixture::new(
            Category::ContentEdgeCases,
            "only_player1",
            ScenarioHeader::standard(TITLE, 100, 5, 3, 3),
            Grid::new(["1  ", "   ", "   "]),
            player_one_wins(1),
        ),
    ]
}

/// One shell per tank, identical aggressive algorithms, nothing in between.
pub fn game_logic_fixtures() -> Vec<MapFixture> {
    vec![MapFixture::new(
        Category::GameLogic,
        "shell_exhaustion",
        ScenarioHeader::standard(TITLE, 100, 1, 5, 5),
        Grid::new(["1   2", "     ", "     ", "     ", "     "]),
        ExpectedOutcome::Semantic(Predicate::ShellExhaustion),
    )
    .with_binding(AlgorithmBinding::pair(Algorithm::Chasing, Algorithm::Chasing))]
}

/// Chasing (player 1) against rotating (player 2) on increasingly busy terrain.
pub fn algorithm_comparison_fixtures() -> Vec<MapFixture> {
    let scenario = |name: &str, header: ScenarioHeader, rows: &[&str]| {
        MapFixture::new(
            Category::AlgorithmComparison,
            name,
            header,
            Grid::new(rows.iter().copied()),
            ExpectedOutcome::Semantic(Predicate::ChasingWins),
        )
        .with_binding(AlgorithmBinding::pair(Algorithm::Chasing, Algorithm::Rotating))
    };

    vec![
        scenario(
            "direct_path",
            ScenarioHeader::standard("Direct Path Test", 1000, 10, 5, 10),
            &[
                "##########",
                "#1      2#",
                "#        #",
                "#        #",
                "##########",
            ],
        ),
        scenario(
            "maze_paths",
            ScenarioHeader::standard("Maze Test", 2000, 15, 7, 15),
            &[
                "###############",
                "#1  #   #    #",
                "# # # # # ## #",
                "#   #   #    #",
                "### ### #### #",
                "#          2 #",
                "###############",
            ],
        ),
        scenario(
            "mine_field",
            ScenarioHeader::standard("Mine Field Test", 1500, 20, 6, 12),
            &[
                "############",
                "#1   @    #",
                "#  @   @  #",
                "#   @ @   #",
                "#  @   2  #",
                "############",
            ],
        ),
        scenario(
            "limited_shells",
            ScenarioHeader::standard("Limited Shells Test", 2000, 3, 5, 10),
            &[
                "##########",
                "#1      #",
                "#   @   #",
                "#      2#",
                "##########",
            ],
        ),
    ]
}
