use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Decision algorithm identifier understood by the simulator's algorithm factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Algorithm {
    /// Pursues the nearest enemy tank and fires when aligned.
    Chasing,
    /// Rotates in place and fires periodically.
    Rotating,
    /// Reads actions from the operator.
    Interactive,
    /// Any other identifier, passed through unchanged.
    Other(String),
}

impl Algorithm {
    pub fn as_str(&self) -> &str {
        match self {
            Algorithm::Chasing => "chasing",
            Algorithm::Rotating => "rotating",
            Algorithm::Interactive => "interactive",
            Algorithm::Other(name) => name,
        }
    }
}

impl From<String> for Algorithm {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "chasing" => Algorithm::Chasing,
            "rotating" => Algorithm::Rotating,
            "interactive" => Algorithm::Interactive,
            _ => Algorithm::Other(value),
        }
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered assignment of algorithms to player slots (slot 0 is player 1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmBinding {
    slots: Vec<Algorithm>,
}

impl AlgorithmBinding {
    pub fn new(slots: impl IntoIterator<Item = Algorithm>) -> Self {
        Self {
            slots: slots.into_iter().collect(),
        }
    }

    /// Two-player binding.
    pub fn pair(player1: Algorithm, player2: Algorithm) -> Self {
        Self::new([player1, player2])
    }

    pub fn slots(&self) -> &[Algorithm] {
        &self.slots
    }

    /// Algorithm bound to a 1-based player number.
    pub fn for_player(&self, player: usize) -> Option<&Algorithm> {
        player.checked_sub(1).and_then(|slot| self.slots.get(slot))
    }

    /// Artifact text: one identifier per line, in slot order.
    pub fn render(&self) -> String {
        self.slots
            .iter()
            .map(|algorithm| format!("{algorithm}\n"))
            .collect()
    }

    /// Parse artifact text written by [`AlgorithmBinding::render`].
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Algorithm::from(line.to_string())),
        )
    }

    /// Command-line form accepted by the simulator: `--algorithm1=<id>`, ...
    pub fn cli_args(&self) -> Vec<String> {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot, algorithm)| format!("--algorithm{}={algorithm}", slot + 1))
            .collect()
    }
}

impl Default for AlgorithmBinding {
    /// The simulator falls back to chasing for both players.
    fn default() -> Self {
        Self::pair(Algorithm::Chasing, Algorithm::Chasing)
    }
}

impl fmt::Display for AlgorithmBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.slots.iter().map(Algorithm::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

/// Overwrite the shared algorithm-config artifact and sync it to disk.
///
/// The simulator reads this file once at startup, so it must be written before
/// the dependent run is spawned. Last writer wins.
pub fn write_algorithm_binding(path: &Path, binding: &AlgorithmBinding) -> HarnessResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| HarnessError::storage(parent, err))?;
    }

    let mut file = File::create(path).map_err(|err| HarnessError::storage(path, err))?;
    file.write_all(binding.render().as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|err| HarnessError::storage(path, err))?;

    debug!("wrote algorithm binding [{binding}] to {}", path.display());
    Ok(())
}
