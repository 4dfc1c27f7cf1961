//! Events emitted by the round loop.
//!
//! These exist for observability (logs, output files, progress displays);
//! nothing in the simulation reads them back.

use sf_core::{CategoryId, MachineId, ProductId, Round, WorkpieceId};

/// A workpiece claimed a machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentEvent {
    pub round:      Round,
    /// Simulated time of the assignment (start of the reservation).
    pub time:       f64,
    pub workpiece:  WorkpieceId,
    pub product:    ProductId,
    /// Route step the machine was claimed for.
    pub step_index: usize,
    pub machine:    MachineId,
    /// Actual processing time after the machine's speed is applied.
    pub duration:   f64,
    /// End of the reservation: `time + duration`.
    pub busy_until: f64,
}

/// A workpiece completed its route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvent {
    pub round:     Round,
    pub time:      f64,
    pub workpiece: WorkpieceId,
    pub product:   ProductId,
    /// Route length, i.e. the final `step_index`.
    pub steps:     usize,
}

/// A workpiece has been waiting for a machine longer than
/// `SimConfig::starvation_rounds`.  Emitted once per waiting episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarvationWarning {
    pub round:         Round,
    pub time:          f64,
    pub workpiece:     WorkpieceId,
    pub product:       ProductId,
    pub category:      CategoryId,
    pub waited_rounds: u64,
}

/// Population counts by state at the end of a round.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoundSummary {
    pub round:      Round,
    /// Simulated time the round was processed at (before `now += dt`).
    pub time:       f64,
    pub waiting:    usize,
    pub moving:     usize,
    pub processing: usize,
    pub finished:   usize,
}

impl RoundSummary {
    #[inline]
    pub fn total(&self) -> usize {
        self.waiting + self.moving + self.processing + self.finished
    }
}
