//! Plain data rows written by output backends.

use sf_sim::{AssignmentEvent, CompletionEvent, RoundSummary, StarvationWarning};

/// Static description of one machine, written once before the run.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineRow {
    pub machine:  u32,
    pub name:     String,
    pub category: String,
    pub x:        f64,
    pub y:        f64,
    pub z:        f64,
    pub speed:    f64,
    /// Expected visits from declared demand.
    pub load:     f64,
    /// `load` rescaled into `[0.0, 1.0]`.
    pub load_normalized: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentRow {
    pub round:      u64,
    pub time:       f64,
    pub workpiece:  u32,
    pub product:    u32,
    pub step_index: u32,
    pub machine:    u32,
    pub duration:   f64,
    pub busy_until: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRow {
    pub round:     u64,
    pub time:      f64,
    pub workpiece: u32,
    pub product:   u32,
    pub steps:     u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarvationRow {
    pub round:         u64,
    pub time:          f64,
    pub workpiece:     u32,
    pub product:       u32,
    pub category:      u16,
    pub waited_rounds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSummaryRow {
    pub round:      u64,
    pub time:       f64,
    pub waiting:    u32,
    pub moving:     u32,
    pub processing: u32,
    pub finished:   u32,
}

impl From<&AssignmentEvent> for AssignmentRow {
    fn from(e: &AssignmentEvent) -> Self {
        Self {
            round:      e.round.0,
            time:       e.time,
            workpiece:  e.workpiece.0,
            product:    e.product.0,
            step_index: e.step_index as u32,
            machine:    e.machine.0,
            duration:   e.duration,
            busy_until: e.busy_until,
        }
    }
}

impl From<&CompletionEvent> for CompletionRow {
    fn from(e: &CompletionEvent) -> Self {
        Self {
            round:     e.round.0,
            time:      e.time,
            workpiece: e.workpiece.0,
            product:   e.product.0,
            steps:     e.steps as u32,
        }
    }
}

impl From<&StarvationWarning> for StarvationRow {
    fn from(w: &StarvationWarning) -> Self {
        Self {
            round:         w.round.0,
            time:          w.time,
            workpiece:     w.workpiece.0,
            product:       w.product.0,
            category:      w.category.0,
            waited_rounds: w.waited_rounds,
        }
    }
}

impl From<&RoundSummary> for RoundSummaryRow {
    fn from(s: &RoundSummary) -> Self {
        Self {
            round:      s.round.0,
            time:       s.time,
            waiting:    s.waiting as u32,
            moving:     s.moving as u32,
            processing: s.processing as u32,
            finished:   s.finished as u32,
        }
    }
}
