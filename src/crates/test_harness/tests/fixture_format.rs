use std::fs;

use tank_battle_harness::{
    write_algorithm_binding, Algorithm, AlgorithmBinding, Category, Cell, ExpectedOutcome,
    FixtureLayout, FixtureWriter, Grid, HarnessError, HeaderKey, LineEnding, MapFixture,
    Predicate, ScenarioHeader,
};
use tempfile::tempdir;

fn two_a_side() -> MapFixture {
    MapFixture::new(
        Category::DimensionMismatches,
        "three_by_three",
        ScenarioHeader::standard("Test Map", 100, 5, 3, 3),
        Grid::new(["1 1", "   ", "2 2"]),
        ExpectedOutcome::literal("Player 1 won with 2 tanks still alive\n"),
    )
}

#[test]
fn renders_title_header_separator_and_rows() {
    assert_eq!(
        two_a_side().render_map(),
        "Test Map\nMaxSteps = 100\nNumShells = 5\nRows = 3\nCols = 3\n\n1 1\n   \n2 2\n"
    );
}

#[test]
fn header_keys_render_in_fixed_order_regardless_of_insertion() {
    let header = ScenarioHeader::new("Shuffled")
        .with(HeaderKey::Cols, 4)
        .with(HeaderKey::MaxSteps, 9)
        .with(HeaderKey::Rows, 2);
    let fixture = MapFixture::new(
        Category::HeaderErrors,
        "shuffled",
        header,
        Grid::new(["1  2"]),
        ExpectedOutcome::literal(""),
    );
    assert_eq!(
        fixture.render_map(),
        "Shuffled\nMaxSteps = 9\nRows = 2\nCols = 4\n\n1  2\n"
    );
}

#[test]
fn malformed_header_values_are_written_verbatim() {
    let header = ScenarioHeader::standard("Test Map", 100, 5, 3, 3)
        .with(HeaderKey::MaxSteps, "abc")
        .with(HeaderKey::Cols, "3.14");
    assert_eq!(header.get(HeaderKey::MaxSteps), Some("abc"));
    assert_eq!(header.get(HeaderKey::Cols), Some("3.14"));
    assert_eq!(header.clone().without(HeaderKey::Rows).get(HeaderKey::Rows), None);
}

#[test]
fn crlf_rendering_terminates_every_line() {
    let rendered = two_a_side().with_line_ending(LineEnding::Crlf).render_map();
    assert_eq!(
        rendered,
        "Test Map\r\nMaxSteps = 100\r\nNumShells = 5\r\nRows = 3\r\nCols = 3\r\n\r\n1 1\r\n   \r\n2 2\r\n"
    );
    assert!(!rendered.replace("\r\n", "").contains('\n'));
}

#[test]
fn raw_override_replaces_structured_format() {
    let fixture = MapFixture::raw(
        Category::FileSystem,
        "empty_map",
        "",
        ExpectedOutcome::literal("Error parsing input file: Empty map file\n"),
    );
    assert_eq!(fixture.render_map(), "");
}

#[test]
fn expected_artifacts_hold_literal_text_or_marker() {
    assert_eq!(
        two_a_side().render_expected(),
        "Player 1 won with 2 tanks still alive\n"
    );

    let semantic = MapFixture::new(
        Category::GameLogic,
        "shell_exhaustion",
        ScenarioHeader::standard("Test Map", 100, 1, 5, 5),
        Grid::new(["1   2"]),
        ExpectedOutcome::Semantic(Predicate::ShellExhaustion),
    );
    assert_eq!(semantic.render_expected(), "VERIFY_SHELL_EXHAUSTION\n");
    assert_eq!(Predicate::ChasingWins.marker(), "VERIFY_CHASING_WINS");
}

#[test]
fn grid_cells_follow_the_map_vocabulary() {
    let grid = Grid::from_cells(&[
        vec![Cell::Wall, Cell::Wall, Cell::Wall],
        vec![Cell::Tank(1), Cell::Obstacle, Cell::Tank(2)],
        vec![Cell::Empty, Cell::Tank(1), Cell::Empty],
    ]);
    assert_eq!(grid.rows(), &["###", "1@2", " 1 "]);
    assert_eq!(grid.tank_count(1), 2);
    assert_eq!(grid.tank_count(2), 1);
    assert_eq!(Grid::new(["   ", "   "]).tank_count(1), 0);
    assert_eq!(Cell::from_char('x'), Cell::Empty);
}

#[test]
fn writer_creates_directories_and_overwrites() {
    let dir = tempdir().expect("temp dir");
    let writer = FixtureWriter::new(FixtureLayout::new(dir.path()));
    let fixture = two_a_side();

    let written = writer.write_fixture(&fixture).expect("first write");
    assert_eq!(
        written.map_path,
        dir.path()
            .join("maps")
            .join("dimension_mismatches")
            .join("three_by_three.txt")
    );
    assert_eq!(
        written.expected_path,
        dir.path()
            .join("expected_outputs")
            .join("three_by_three_expected.txt")
    );

    fs::write(&written.map_path, "stale").expect("scribble over map");
    let again = writer.write_fixture(&fixture).expect("second write");
    assert_eq!(again, written);
    assert_eq!(
        fs::read_to_string(&written.map_path).unwrap(),
        fixture.render_map()
    );
    assert_eq!(
        fs::read_to_string(&written.expected_path).unwrap(),
        fixture.render_expected()
    );
}

#[test]
fn layout_overrides_move_each_artifact() {
    let dir = tempdir().expect("temp dir");
    let layout = FixtureLayout::new(dir.path())
        .with_maps_dir(dir.path().join("boards"))
        .with_expected_dir(dir.path().join("oracles"))
        .with_manifest_path(dir.path().join("index.json"));
    assert_eq!(
        layout.map_path("game_logic", "shell_exhaustion"),
        dir.path()
            .join("boards")
            .join("game_logic")
            .join("shell_exhaustion.txt")
    );
    assert_eq!(layout.manifest_path, dir.path().join("index.json"));

    let written = FixtureWriter::new(layout)
        .write_fixture(&two_a_side())
        .expect("write fixture");
    assert!(written.map_path.starts_with(dir.path().join("boards")));
    assert_eq!(
        written.expected_path,
        dir.path().join("oracles").join("three_by_three_expected.txt")
    );
    assert!(written.expected_path.is_file());
}

#[test]
fn storage_errors_propagate_with_the_failing_path() {
    let dir = tempdir().expect("temp dir");
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();

    let writer = FixtureWriter::new(FixtureLayout::new(&blocker));
    let err = writer
        .write_fixture(&two_a_side())
        .expect_err("maps dir cannot be created under a file");
    match err {
        HarnessError::Storage { path, .. } => assert!(path.starts_with(&blocker)),
        other => panic!("expected storage error, got {other:?}"),
    }
}

#[test]
fn binding_artifact_lists_one_algorithm_per_line() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("build").join("algorithm_types.txt");

    let binding = AlgorithmBinding::pair(Algorithm::Chasing, Algorithm::Rotating);
    write_algorithm_binding(&path, &binding).expect("write binding");
    assert_eq!(fs::read_to_string(&path).unwrap(), "chasing\nrotating\n");

    write_algorithm_binding(&path, &AlgorithmBinding::default()).expect("overwrite binding");
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "chasing\nchasing\n");
    assert_eq!(AlgorithmBinding::parse(&text), AlgorithmBinding::default());
}

#[test]
fn binding_renders_simulator_arguments() {
    let binding = AlgorithmBinding::pair(Algorithm::Chasing, Algorithm::Other("simple".into()));
    assert_eq!(
        binding.cli_args(),
        vec!["--algorithm1=chasing", "--algorithm2=simple"]
    );
    assert_eq!(binding.for_player(2), Some(&Algorithm::Other("simple".into())));
    assert_eq!(
        binding.slots(),
        &[Algorithm::Chasing, Algorithm::Other("simple".into())]
    );
    assert_eq!(binding.for_player(0), None);
    assert_eq!(Algorithm::from("Rotating".to_string()), Algorithm::Rotating);
}
