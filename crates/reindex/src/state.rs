// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reindex run lifecycle state machine
//!
//! ```text
//! Created --Start--> Running --Finalize-----> Finalized --+
//!    |                  |----SkipFinalize--> Incomplete --+--Shutdown--> Closed
//!    |                  +----Abort---------> Aborted -----+
//!    +------------------------Shutdown--------------------^
//! ```

use crate::error::ReindexError;
use std::fmt;

/// Phase of a reindex run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    /// Constructed, workers built but not started
    Created,
    /// Workers are pulling batches
    Running,
    /// Every worker joined and membership indexing committed
    Finalized,
    /// Every worker joined but errors blocked finalization
    Incomplete,
    /// A coordination or finalization failure ended the run
    Aborted,
    /// Id source released; nothing further is valid
    Closed,
}

/// Inputs that drive run transitions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunInput {
    Start,
    Finalize,
    SkipFinalize,
    Abort,
    Shutdown,
}

impl RunPhase {
    /// Whether the run has finished, one way or another
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RunPhase::Finalized | RunPhase::Incomplete | RunPhase::Aborted
        )
    }

    /// Pure state transition function
    pub fn transition(self, input: RunInput) -> Result<RunPhase, ReindexError> {
        let next = match (self, input) {
            (RunPhase::Created, RunInput::Start) => RunPhase::Running,
            (RunPhase::Running, RunInput::Finalize) => RunPhase::Finalized,
            (RunPhase::Running, RunInput::SkipFinalize) => RunPhase::Incomplete,
            (RunPhase::Running, RunInput::Abort) => RunPhase::Aborted,
            (RunPhase::Created, RunInput::Shutdown) => RunPhase::Closed,
            (phase, RunInput::Shutdown) if phase.is_finished() => RunPhase::Closed,
            (from, input) => return Err(ReindexError::InvalidState { from, input }),
        };
        Ok(next)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Created => "created",
            RunPhase::Running => "running",
            RunPhase::Finalized => "finalized",
            RunPhase::Incomplete => "incomplete",
            RunPhase::Aborted => "aborted",
            RunPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
