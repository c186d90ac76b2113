use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Prefix of the single-line marker that selects a semantic predicate.
pub const MARKER_PREFIX: &str = "VERIFY_";

/// Named semantic check over a transcript.
///
/// The set is closed: every predicate a catalog can reference is a variant here,
/// so a typed catalog cannot name a predicate the verifier lacks. Only marker
/// text coming from disk can be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Both sides fire, then the game ends on the zero-shells tie.
    ShellExhaustion,
    /// Both sides engage and player 1 wins.
    ChasingWins,
}

impl Predicate {
    pub const ALL: [Predicate; 2] = [Predicate::ShellExhaustion, Predicate::ChasingWins];

    pub fn name(self) -> &'static str {
        match self {
            Predicate::ShellExhaustion => "shell_exhaustion",
            Predicate::ChasingWins => "chasing_wins",
        }
    }

    /// Marker line written to the expected-output artifact, e.g. `VERIFY_CHASING_WINS`.
    pub fn marker(self) -> String {
        format!("{MARKER_PREFIX}{}", self.name().to_ascii_uppercase())
    }

    /// Resolve a marker line such as `VERIFY_SHELL_EXHAUSTION`.
    pub fn from_marker(marker: &str) -> HarnessResult<Self> {
        let name = marker
            .trim()
            .strip_prefix(MARKER_PREFIX)
            .ok_or_else(|| HarnessError::UnknownPredicate(marker.trim().to_string()))?;
        name.parse()
            .map_err(|_| HarnessError::UnknownPredicate(marker.trim().to_string()))
    }
}

impl FromStr for Predicate {
    type Err = HarnessError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim().to_ascii_lowercase();
        Predicate::ALL
            .into_iter()
            .find(|predicate| predicate.name() == wanted)
            .ok_or_else(|| HarnessError::UnknownPredicate(name.trim().to_string()))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a fixture expects from the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedOutcome {
    /// Exact transcript text.
    Literal(String),
    /// Checked by a named predicate.
    Semantic(Predicate),
}

impl ExpectedOutcome {
    pub fn literal(text: impl Into<String>) -> Self {
        ExpectedOutcome::Literal(text.into())
    }

    /// Text of the expected-output artifact.
    pub fn render_artifact(&self) -> String {
        match self {
            ExpectedOutcome::Literal(text) => text.clone(),
            ExpectedOutcome::Semantic(predicate) => format!("{}\n", predicate.marker()),
        }
    }

    /// Parse an expected-output artifact.
    ///
    /// A lone `VERIFY_<NAME>` line selects a predicate and fails with
    /// [`HarnessError::UnknownPredicate`] when the name is not registered.
    /// Anything else is a literal.
    pub fn parse_artifact(text: &str) -> HarnessResult<Self> {
        let trimmed = text.trim();
        if trimmed.starts_with(MARKER_PREFIX) && !trimmed.contains('\n') {
            return Predicate::from_marker(trimmed).map(ExpectedOutcome::Semantic);
        }
        Ok(ExpectedOutcome::Literal(text.to_string()))
    }
}
