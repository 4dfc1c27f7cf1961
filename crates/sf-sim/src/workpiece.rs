//! The workpiece state machine.
//!
//! ```text
//!            find_free ok            arrived              remaining <= 0
//! NeedAssign ───────────▶ Moving ─────────────▶ Processing ───────────────┐
//!     ▲  │ route exhausted                                                │
//!     │  └──────────────────────────────────▶ Finished ◀── last step ─────┤
//!     └──────────────────────── more steps ───────────────────────────────┘
//! ```
//!
//! Each transition is a method taking the simulated time or timestep
//! explicitly; the orchestrator in [`crate::sim`] decides which method runs in
//! which phase and turns the returned outcomes into events and draw calls.

use std::fmt;

use sf_core::{MachineId, ProductId, Vec3, WorkpieceId};
use sf_floor::MachineRegistry;

use crate::motion::approach;
use crate::{RouteStep, SimResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum WorkpieceState {
    #[default]
    NeedAssign,
    Moving,
    Processing,
    Finished,
}

impl fmt::Display for WorkpieceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkpieceState::NeedAssign => "waiting",
            WorkpieceState::Moving     => "moving",
            WorkpieceState::Processing => "processing",
            WorkpieceState::Finished   => "finished",
        })
    }
}

/// One unit of a product travelling through its route.
#[derive(Debug, Clone, PartialEq)]
pub struct Workpiece {
    pub id:      WorkpieceId,
    pub product: ProductId,
    /// 0-based index among the workpieces of the same product.
    pub serial:  u32,

    /// Route cursor.  Never decreases; equals the route length once finished.
    pub step_index: usize,

    pub state:    WorkpieceState,
    pub position: Vec3,
    /// Position of the assigned machine while `Moving` / `Processing`.
    pub target:   Vec3,
    pub machine:  Option<MachineId>,

    /// Processing time left on the current step.
    pub remaining: f64,

    /// Consecutive rounds spent in `NeedAssign` without a machine.
    pub waiting_rounds: u64,
    /// Set once a starvation warning has been raised for the current wait.
    pub starvation_reported: bool,
}

/// Result of [`Workpiece::try_assign`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignOutcome {
    /// Route exhausted; the workpiece is now `Finished`.
    Finished,
    /// No free machine of the required category.
    Waiting,
    /// Claimed `machine` until `busy_until`.
    Assigned {
        machine:    MachineId,
        duration:   f64,
        busy_until: f64,
    },
}

/// Result of a processing step that reached zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDone {
    /// The machine that was released, if any.
    pub machine:  Option<MachineId>,
    /// `true` when that was the last step of the route.
    pub finished: bool,
}

impl Workpiece {
    pub fn new(id: WorkpieceId, product: ProductId, serial: u32, spawn: Vec3) -> Self {
        Self {
            id,
            product,
            serial,
            step_index: 0,
            state: WorkpieceState::NeedAssign,
            position: spawn,
            target: spawn,
            machine: None,
            remaining: 0.0,
            waiting_rounds: 0,
            starvation_reported: false,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == WorkpieceState::Finished
    }

    /// `NeedAssign` transition: claim the first free machine for the current
    /// step, or finish if the route has no steps left.
    pub fn try_assign(
        &mut self,
        route:    &[RouteStep],
        registry: &mut MachineRegistry,
        now:      f64,
    ) -> SimResult<AssignOutcome> {
        debug_assert_eq!(self.state, WorkpieceState::NeedAssign);

        let Some(step) = route.get(self.step_index) else {
            self.step_index = route.len();
            self.state = WorkpieceState::Finished;
            return Ok(AssignOutcome::Finished);
        };

        let Some(machine) = registry.find_free(step.category, now) else {
            self.waiting_rounds += 1;
            return Ok(AssignOutcome::Waiting);
        };

        // find_free only returns registered ids.
        let (duration, target) = match registry.get(machine) {
            Some(m) => (m.processing_time(step.base_duration), m.position),
            None => return Ok(AssignOutcome::Waiting),
        };
        let busy_until = registry.reserve(machine, self.id, now, duration)?;

        self.machine = Some(machine);
        self.target = target;
        self.remaining = duration;
        self.waiting_rounds = 0;
        self.starvation_reported = false;
        self.state = WorkpieceState::Moving;

        Ok(AssignOutcome::Assigned { machine, duration, busy_until })
    }

    /// `Moving` transition: approach the machine by `factor` of the remaining
    /// distance.  Returns `true` on arrival (state is then `Processing`).
    pub fn advance_motion(&mut self, factor: f64, tolerance: f64) -> bool {
        debug_assert_eq!(self.state, WorkpieceState::Moving);

        self.position = approach(self.position, self.target, factor);
        if self.position.within(self.target, tolerance) {
            self.state = WorkpieceState::Processing;
            true
        } else {
            false
        }
    }

    /// `Processing` transition: spend `dt` on the current step.  When the step
    /// completes the machine is released and the cursor advances.
    pub fn advance_processing(
        &mut self,
        dt:        f64,
        route_len: usize,
        registry:  &mut MachineRegistry,
    ) -> SimResult<Option<StepDone>> {
        debug_assert_eq!(self.state, WorkpieceState::Processing);

        self.remaining -= dt;
        if self.remaining > 0.0 {
            return Ok(None);
        }

        let machine = self.machine.take();
        if let Some(machine) = machine {
            registry.release(machine, self.id)?;
        }

        self.remaining = 0.0;
        self.step_index = (self.step_index + 1).min(route_len);
        let finished = self.step_index >= route_len;
        self.state = if finished { WorkpieceState::Finished } else { WorkpieceState::NeedAssign };
        Ok(Some(StepDone { machine, finished }))
    }
}
