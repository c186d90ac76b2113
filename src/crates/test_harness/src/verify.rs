use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::HarnessResult;
use crate::outcome::{ExpectedOutcome, Predicate};

/// Substring marking a tank that fired during a step.
pub const FIRE_MARKER: &str = "Shoot";

/// Final line the simulator prints after both sides ran dry for the grace period.
pub const SHELL_EXHAUSTION_LINE: &str = "Tie, both players have zero shells for 40 steps";

/// Prefix of the final line when player 1 wins.
pub const PLAYER_ONE_WIN_PREFIX: &str = "Player 1 won with";

/// Outcome of a single verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub passed: bool,
    pub errors: Vec<String>,
}

impl VerificationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
        }
    }
}

/// Check a transcript against an expected outcome.
pub fn verify(actual: &str, outcome: &ExpectedOutcome) -> VerificationReport {
    let errors = match outcome {
        ExpectedOutcome::Literal(expected) => {
            if actual == expected {
                Vec::new()
            } else {
                vec![format!("Expected output {expected:?}, but got {actual:?}")]
            }
        }
        ExpectedOutcome::Semantic(predicate) => evaluate(*predicate, &Transcript::new(actual)),
    };
    debug!("verification finished with {} error(s)", errors.len());
    VerificationReport::from_errors(errors)
}

/// Check a transcript against the raw text of an expected-output artifact.
///
/// Fails only when the artifact names an unknown predicate; a mismatch is a
/// failed report.
pub fn verify_artifact(actual: &str, expected_artifact: &str) -> HarnessResult<VerificationReport> {
    let outcome = ExpectedOutcome::parse_artifact(expected_artifact)?;
    Ok(verify(actual, &outcome))
}

/// Every condition is checked so one report lists all violations.
fn evaluate(predicate: Predicate, transcript: &Transcript<'_>) -> Vec<String> {
    let mut errors = Vec::new();
    let last = transcript.last_line();
    match predicate {
        Predicate::ShellExhaustion => {
            if !transcript.fired_before_last() {
                errors.push(format!("No '{FIRE_MARKER}' action found in output"));
            }
            if last != SHELL_EXHAUSTION_LINE {
                errors.push(format!(
                    "Expected last line to be '{SHELL_EXHAUSTION_LINE}', but got: {last}"
                ));
            }
        }
        Predicate::ChasingWins => {
            if !transcript.fired_before_last() {
                errors.push(format!(
                    "No '{FIRE_MARKER}' action found in output - tanks must engage in combat"
                ));
            }
            if !last.starts_with(PLAYER_ONE_WIN_PREFIX) {
                errors.push(format!("Expected player 1 (chasing) to win, but got: {last}"));
            }
        }
    }
    errors
}

/// Line view over simulator output.
///
/// Surrounding whitespace is trimmed before splitting, so an empty transcript
/// has a single empty final line.
#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Transcript<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines = text
            .trim()
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn last_line(&self) -> &'a str {
        self.lines.last().copied().unwrap_or("")
    }

    /// Step lines, i.e. everything except the terminal result line.
    pub fn step_lines(&self) -> &[&'a str] {
        match self.lines.split_last() {
            Some((_, steps)) => steps,
            None => &[],
        }
    }

    pub fn fired_before_last(&self) -> bool {
        self.step_lines().iter().any(|line| line.contains(FIRE_MARKER))
    }
}
