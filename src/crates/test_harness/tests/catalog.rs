use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tank_battle_harness::{
    verify, Algorithm, AlgorithmBinding, Catalog, Category, ExpectedOutcome, FixtureLayout,
    FixtureWriter, Grid, HarnessError, HeaderKey, Manifest, MapFixture, Predicate, ScenarioHeader,
};
use tempfile::tempdir;

fn standard() -> Catalog {
    Catalog::standard().expect("standard catalog should validate")
}

fn fixture<'a>(catalog: &'a Catalog, category: Category, name: &str) -> &'a MapFixture {
    catalog
        .find(category, name)
        .unwrap_or_else(|| panic!("missing fixture {category}/{name}"))
}

fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let key = path.strip_prefix(root).unwrap().display().to_string();
                files.insert(key, fs::read(&path).expect("read file"));
            }
        }
    }
    files
}

#[test]
fn every_category_is_populated() {
    let catalog = standard();
    for category in Category::ALL {
        assert!(
            catalog.in_category(category).count() > 0,
            "{category} has no fixtures"
        );
    }
    assert_eq!(catalog.enumerate().len(), 14);
}

#[test]
fn file_system_fixtures_cover_empty_and_crlf() {
    let catalog = standard();

    let empty = fixture(&catalog, Category::FileSystem, "empty_map");
    assert_eq!(empty.render_map(), "");
    assert_eq!(
        empty.expected,
        ExpectedOutcome::literal("Error parsing input file: Empty map file\n")
    );

    let crlf = fixture(&catalog, Category::FileSystem, "crlf_map");
    assert_eq!(
        crlf.render_map(),
        "Test Map\r\nMaxSteps = 100\r\nNumShells = 5\r\nRows = 3\r\nCols = 3\r\n\r\n1 1\r\n   \r\n2 2\r\n"
    );
    assert_eq!(
        crlf.expected,
        ExpectedOutcome::literal("Player 1 won with 2 tanks still alive\n")
    );
}

#[test]
fn header_error_fixtures_drop_keys_or_corrupt_values() {
    let catalog = standard();

    let missing = fixture(&catalog, Category::HeaderErrors, "missing_maxsteps");
    assert_eq!(
        missing.render_map(),
        "Test Map\nNumShells = 5\nRows = 3\nCols = 3\n\n1 1\n   \n2 2\n"
    );
    assert_eq!(
        missing.expected,
        ExpectedOutcome::literal("Error parsing input file: Invalid parameter format: \n")
    );

    let missing_shells = fixture(&catalog, Category::HeaderErrors, "missing_numshells");
    assert_eq!(
        missing_shells.render_map(),
        "Test Map\nMaxSteps = 100\nRows = 3\nCols = 3\n\n1 1\n   \n2 2\n"
    );

    let invalid = fixture(&catalog, Category::HeaderErrors, "invalid_values");
    assert_eq!(
        invalid.render_map(),
        "Test Map\nMaxSteps = abc\nNumShells = 5\nRows = -1\nCols = 3.14\n\n1 1\n   \n2 2\n"
    );
    assert_eq!(
        invalid.expected,
        ExpectedOutcome::literal(
            "Error parsing input file: Invalid value in parameter: MaxSteps = abc\n"
        )
    );
}

#[test]
fn dimension_mismatches_disagree_with_declared_rows() {
    let catalog = standard();

    let fewer = fixture(&catalog, Category::DimensionMismatches, "fewer_rows");
    assert_eq!(fewer.header.get(HeaderKey::Rows), Some("5"));
    assert_eq!(fewer.grid.rows().len(), 2);

    let more = fixture(&catalog, Category::DimensionMismatches, "more_rows");
    assert_eq!(more.header.get(HeaderKey::Rows), Some("2"));
    assert_eq!(
        more.render_map(),
        "Test Map\nMaxSteps = 100\nNumShells = 5\nRows = 2\nCols = 3\n\n1 1\n   \n2 2\nExtra\nExtra\n"
    );

    for mismatch in catalog.in_category(Category::DimensionMismatches) {
        assert_eq!(
            mismatch.expected,
            ExpectedOutcome::literal("Player 1 won with 2 tanks still alive\n")
        );
    }
}

#[test]
fn content_edge_cases_expect_tie_or_lone_winner() {
    let catalog = standard();

    let no_tanks = fixture(&catalog, Category::ContentEdgeCases, "no_tanks");
    assert!(no_tanks
        .grid
        .rows()
        .iter()
        .all(|row| !row.chars().any(|c| c.is_ascii_digit())));
    assert_eq!(
        no_tanks.expected,
        ExpectedOutcome::literal("Tie, both players have zero tanks\n")
    );

    let lone = fixture(&catalog, Category::ContentEdgeCases, "only_player1");
    assert_eq!(lone.grid.tank_count(1), 1);
    assert_eq!(lone.grid.tank_count(2), 0);
    assert_eq!(
        lone.expected,
        ExpectedOutcome::literal("Player 1 won with 1 tanks still alive\n")
    );
}

#[test]
fn semantic_fixtures_carry_their_bindings() {
    let catalog = standard();

    let exhaustion = fixture(&catalog, Category::GameLogic, "shell_exhaustion");
    assert_eq!(
        exhaustion.expected,
        ExpectedOutcome::Semantic(Predicate::ShellExhaustion)
    );
    assert_eq!(exhaustion.header.get(HeaderKey::NumShells), Some("1"));
    assert_eq!(
        exhaustion.binding,
        AlgorithmBinding::pair(Algorithm::Chasing, Algorithm::Chasing)
    );
    assert!(!exhaustion.grid.rows().iter().any(|row| row.contains(['#', '@'])));

    let comparison: Vec<_> = catalog
        .in_category(Category::AlgorithmComparison)
        .map(|fixture| fixture.name.as_str())
        .collect();
    assert_eq!(
        comparison,
        ["direct_path", "maze_paths", "mine_field", "limited_shells"]
    );
    for fixture in catalog.in_category(Category::AlgorithmComparison) {
        assert_eq!(fixture.expected, ExpectedOutcome::Semantic(Predicate::ChasingWins));
        assert_eq!(
            fixture.binding,
            AlgorithmBinding::pair(Algorithm::Chasing, Algorithm::Rotating)
        );
    }
}

#[test]
fn binding_switches_only_when_the_binding_changes() {
    let catalog = standard();
    let schedule = catalog.binding_schedule();
    let switches: Vec<(&str, String)> = schedule
        .iter()
        .map(|(index, binding)| {
            (
                catalog.enumerate()[*index].name.as_str(),
                binding.to_string(),
            )
        })
        .collect();
    assert_eq!(
        switches,
        vec![
            ("empty_map", "chasing, chasing".to_string()),
            ("direct_path", "chasing, rotating".to_string()),
        ]
    );
}

#[test]
fn generation_is_idempotent() {
    let catalog = standard();
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let writer = FixtureWriter::new(FixtureLayout::new(first_dir.path()));
    catalog.generate(&writer).expect("first generation");
    let first = snapshot(first_dir.path());

    catalog.generate(&writer).expect("regeneration");
    assert_eq!(snapshot(first_dir.path()), first);

    // Paths in the manifest differ between roots; everything else must not.
    let other = FixtureWriter::new(FixtureLayout::new(second_dir.path()));
    Catalog::standard().unwrap().generate(&other).expect("fresh catalog");
    let mut second = snapshot(second_dir.path());
    let mut first = first;
    first.remove("manifest.json");
    second.remove("manifest.json");
    assert_eq!(first, second);
}

#[test]
fn generation_writes_maps_expected_outputs_binding_and_manifest() {
    let catalog = standard();
    let dir = tempdir().expect("temp dir");
    let layout = FixtureLayout::new(dir.path());
    let writer = FixtureWriter::new(layout.clone());
    let written = catalog.generate(&writer).expect("generation");
    assert_eq!(written.len(), catalog.enumerate().len());

    let three_by_three = fs::read_to_string(
        layout
            .maps_dir
            .join("dimension_mismatches")
            .join("more_rows.txt"),
    )
    .unwrap();
    assert!(three_by_three.ends_with("Extra\nExtra\n"));
    assert_eq!(
        fs::read_to_string(layout.expected_path("shell_exhaustion")).unwrap(),
        "VERIFY_SHELL_EXHAUSTION\n"
    );
    assert_eq!(
        fs::read_to_string(layout.expected_path("maze_paths")).unwrap(),
        "VERIFY_CHASING_WINS\n"
    );

    // Algorithm comparison is generated last, so its binding is what remains.
    assert_eq!(
        fs::read_to_string(&layout.binding_path).unwrap(),
        "chasing\nrotating\n"
    );

    let manifest: Manifest =
        serde_json::from_str(&fs::read_to_string(&layout.manifest_path).unwrap())
            .expect("manifest should parse");
    assert_eq!(manifest, catalog.manifest(&writer));
    let entry = manifest
        .fixtures
        .iter()
        .find(|entry| entry.id == "game_logic/shell_exhaustion")
        .expect("manifest entry");
    assert_eq!(
        entry.expected,
        ExpectedOutcome::Semantic(Predicate::ShellExhaustion)
    );
    assert_eq!(entry.paths, written[catalog.enumerate().len() - 5]);
}

#[test]
fn concrete_literal_scenarios_verify() {
    let catalog = standard();
    let check = |category, name, transcript: &str| {
        let report = verify(transcript, &fixture(&catalog, category, name).expected);
        assert!(report.passed, "{name}: {:?}", report.errors);
    };

    check(
        Category::FileSystem,
        "crlf_map",
        "Player 1 won with 2 tanks still alive\n",
    );
    check(
        Category::ContentEdgeCases,
        "no_tanks",
        "Tie, both players have zero tanks\n",
    );
    check(
        Category::FileSystem,
        "empty_map",
        "Error parsing input file: Empty map file\n",
    );
}

#[test]
fn duplicate_fixtures_are_rejected() {
    let make = |category| {
        MapFixture::new(
            category,
            "twin",
            ScenarioHeader::standard("Twin", 10, 1, 1, 1),
            Grid::new(["1"]),
            ExpectedOutcome::literal("Player 1 won with 1 tanks still alive\n"),
        )
    };

    let same_id = Catalog::new(vec![make(Category::GameLogic), make(Category::GameLogic)]);
    assert!(matches!(same_id, Err(HarnessError::DuplicateFixture(_))));

    // Different categories still collide in the flat expected-output directory.
    let same_name = Catalog::new(vec![make(Category::GameLogic), make(Category::FileSystem)]);
    assert!(matches!(same_name, Err(HarnessError::DuplicateFixture(_))));
}
