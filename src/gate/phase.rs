use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stage of the startup authentication check.
///
/// Phases are totally ordered `Unchecked < Checking < Done` and only ever move forward.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Unchecked,
    Checking,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Unchecked => "unchecked",
            Phase::Checking => "checking",
            Phase::Done => "done",
        }
    }

    /// Numeric value exported through the `auth_phase` gauge.
    pub fn as_gauge(&self) -> i64 {
        match self {
            Phase::Unchecked => 0,
            Phase::Checking => 1,
            Phase::Done => 2,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Phase::Done)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected phase transitions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    #[error("phase cannot move backward from '{from}' to '{to}'")]
    Regression { from: Phase, to: Phase },

    #[error("auth check already finished")]
    AlreadyDone,
}
