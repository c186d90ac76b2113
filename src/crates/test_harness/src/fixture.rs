use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::binding::AlgorithmBinding;
use crate::config::FixtureLayout;
use crate::error::{HarnessError, HarnessResult};
use crate::outcome::ExpectedOutcome;

/// Header keys the simulator recognizes, in the order they are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeaderKey {
    MaxSteps,
    NumShells,
    Rows,
    Cols,
}

impl HeaderKey {
    pub const ALL: [HeaderKey; 4] = [
        HeaderKey::MaxSteps,
        HeaderKey::NumShells,
        HeaderKey::Rows,
        HeaderKey::Cols,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeaderKey::MaxSteps => "MaxSteps",
            HeaderKey::NumShells => "NumShells",
            HeaderKey::Rows => "Rows",
            HeaderKey::Cols => "Cols",
        }
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title line plus raw header values.
///
/// Values are never validated: malformed numbers are legitimate fixture inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioHeader {
    pub title: String,
    pub params: BTreeMap<HeaderKey, String>,
}

impl ScenarioHeader {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            params: BTreeMap::new(),
        }
    }

    /// Header with all four keys set from numbers.
    pub fn standard(
        title: impl Into<String>,
        max_steps: u32,
        num_shells: u32,
        rows: u32,
        cols: u32,
    ) -> Self {
        Self::new(title)
            .with(HeaderKey::MaxSteps, max_steps)
            .with(HeaderKey::NumShells, num_shells)
            .with(HeaderKey::Rows, rows)
            .with(HeaderKey::Cols, cols)
    }

    pub fn with(mut self, key: HeaderKey, value: impl ToString) -> Self {
        self.params.insert(key, value.to_string());
        self
    }

    pub fn without(mut self, key: HeaderKey) -> Self {
        self.params.remove(&key);
        self
    }

    pub fn get(&self, key: HeaderKey) -> Option<&str> {
        self.params.get(&key).map(String::as_str)
    }
}

/// Single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Empty,
    /// Mine; destroys a tank that drives onto it.
    Obstacle,
    /// Tank owned by the given player (1-9).
    Tank(u8),
}

impl Cell {
    /// Unknown characters read as empty, as the simulator treats them.
    pub fn from_char(c: char) -> Self {
        match c {
            '#' => Cell::Wall,
            '@' => Cell::Obstacle,
            '1'..='9' => Cell::Tank(c as u8 - b'0'),
            _ => Cell::Empty,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Empty => ' ',
            Cell::Obstacle => '@',
            Cell::Tank(player) => char::from(b'0' + player.min(9)),
        }
    }
}

/// Board rows, written verbatim.
///
/// Row count and widths may disagree with the header on purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<String>,
}

impl Grid {
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_cells(cells: &[Vec<Cell>]) -> Self {
        Self::new(
            cells
                .iter()
                .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>()),
        )
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().flat_map(|row| row.chars().map(Cell::from_char))
    }

    pub fn tank_count(&self, player: u8) -> usize {
        self.cells().filter(|cell| *cell == Cell::Tank(player)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Fixture category; also the map sub-directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FileSystem,
    HeaderErrors,
    DimensionMismatches,
    ContentEdgeCases,
    GameLogic,
    AlgorithmComparison,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::FileSystem,
        Category::HeaderErrors,
        Category::DimensionMismatches,
        Category::ContentEdgeCases,
        Category::GameLogic,
        Category::AlgorithmComparison,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::FileSystem => "file_system",
            Category::HeaderErrors => "header_errors",
            Category::DimensionMismatches => "dimension_mismatches",
            Category::ContentEdgeCases => "content_edge_cases",
            Category::GameLogic => "game_logic",
            Category::AlgorithmComparison => "algorithm_comparison",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A scenario input file paired with its expected outcome and algorithm binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFixture {
    pub category: Category,
    pub name: String,
    pub header: ScenarioHeader,
    pub grid: Grid,
    /// Literal file contents used instead of the structured rendering.
    pub raw_override: Option<String>,
    pub line_ending: LineEnding,
    pub expected: ExpectedOutcome,
    pub binding: AlgorithmBinding,
}

impl MapFixture {
    pub fn new(
        category: Category,
        name: impl Into<String>,
        header: ScenarioHeader,
        grid: Grid,
        expected: ExpectedOutcome,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            header,
            grid,
            raw_override: None,
            line_ending: LineEnding::Lf,
            expected,
            binding: AlgorithmBinding::default(),
        }
    }

    /// Fixture whose map file is exactly `contents`.
    pub fn raw(
        category: Category,
        name: impl Into<String>,
        contents: impl Into<String>,
        expected: ExpectedOutcome,
    ) -> Self {
        let mut fixture = Self::new(
            category,
            name,
            ScenarioHeader::default(),
            Grid::default(),
            expected,
        );
        fixture.raw_override = Some(contents.into());
        fixture
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_binding(mut self, binding: AlgorithmBinding) -> Self {
        self.binding = binding;
        self
    }

    /// `category/name`, unique within a catalog.
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    /// Map file contents.
    pub fn render_map(&self) -> String {
        if let Some(raw) = &self.raw_override {
            return raw.clone();
        }

        let eol = self.line_ending.as_str();
        let mut out = String::new();
        out.push_str(&self.header.title);
        out.push_str(eol);
        for (key, value) in &self.header.params {
            out.push_str(&format!("{key} = {value}{eol}"));
        }
        out.push_str(eol);
        for row in self.grid.rows() {
            out.push_str(row);
            out.push_str(eol);
        }
        out
    }

    pub fn render_expected(&self) -> String {
        self.expected.render_artifact()
    }
}

/// Paths produced by [`FixtureWriter::write_fixture`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFixture {
    pub map_path: PathBuf,
    pub expected_path: PathBuf,
}

/// Writes map files and expected-output artifacts under a [`FixtureLayout`].
#[derive(Debug, Clone)]
pub struct FixtureWriter {
    layout: FixtureLayout,
}

impl FixtureWriter {
    pub fn new(layout: FixtureLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FixtureLayout {
        &self.layout
    }

    pub fn paths_for(&self, fixture: &MapFixture) -> WrittenFixture {
        WrittenFixture {
            map_path: self.layout.map_path(fixture.category.dir_name(), &fixture.name),
            expected_path: self.layout.expected_path(&fixture.name),
        }
    }

    /// Write both artifacts, creating directories as needed and overwriting
    /// whatever a previous run left behind.
    pub fn write_fixture(&self, fixture: &MapFixture) -> HarnessResult<WrittenFixture> {
        let written = self.paths_for(fixture);
        write_file(&written.map_path, &fixture.render_map())?;
        write_file(&written.expected_path, &fixture.render_expected())?;
        debug!(
            "wrote fixture {} -> {}",
            fixture.id(),
            written.map_path.display()
        );
        Ok(written)
    }
}

pub(crate) fn write_file(path: &Path, contents: &str) -> HarnessResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| HarnessError::storage(parent, err))?;
    }
    fs::write(path, contents).map_err(|err| HarnessError::storage(path, err))
}
