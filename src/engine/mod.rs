pub mod learn;
pub mod rescue;
pub mod stats;

use thiserror::Error;

/// Milliseconds on the host's monotonic clock.
pub type Millis = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty '{given}' (expected one of: {expected})")]
pub struct ParseDifficultyError {
    pub given: String,
    pub expected: &'static str,
}
