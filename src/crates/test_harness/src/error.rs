use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors raised while generating fixtures or driving the simulator.
///
/// A transcript that does not match its expected outcome is not an error; it is
/// reported through [`crate::VerificationReport`].
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to write {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown verification predicate: {0}")]
    UnknownPredicate(String),
    #[error("duplicate fixture in catalog: {0}")]
    DuplicateFixture(String),
    #[error("failed to spawn simulator: {0}")]
    SimulatorStart(String),
    #[error("simulator did not finish within {0:?}")]
    Timeout(Duration),
    #[error("simulator produced no transcript at {}", .0.display())]
    MissingTranscript(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn simulator_start(err: impl Into<String>) -> Self {
        HarnessError::SimulatorStart(err.into())
    }

    /// True when the error points at a catalog/verifier mismatch rather than a
    /// simulator defect.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HarnessError::UnknownPredicate(_) | HarnessError::DuplicateFixture(_)
        )
    }
}
