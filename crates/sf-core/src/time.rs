//! Simulation time model.
//!
//! # Design
//!
//! The simulation advances in **rounds**.  Each round applies one timestep
//! `dt` (simulated seconds) to the whole floor, after which
//!
//!   now += dt
//!
//! `SimClock` owns both the round counter and the accumulated simulated time.
//! It is threaded explicitly through every state-machine call; there is no
//! global clock.  Machine reservations (`busy_until`) are compared against
//! `SimClock::now` only.

use std::fmt;

use crate::{CoreError, CoreResult, Vec3};

// ── Round ─────────────────────────────────────────────────────────────────────

/// An absolute round counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round(pub u64);

impl std::ops::Add<u64> for Round {
    type Output = Round;
    #[inline]
    fn add(self, rhs: u64) -> Round {
        Round(self.0 + rhs)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Current round and accumulated simulated seconds.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds elapsed since round 0.  Monotonically increasing.
    pub now: f64,
    /// The round about to be (or being) processed.
    pub round: Round,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the current round: `now += dt`, `round += 1`.
    ///
    /// Callers validate `dt` first (see [`check_timestep`]).
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.now += dt;
        self.round = self.round + 1;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t={:.3}s)", self.round, self.now)
    }
}

/// Reject timesteps that would stall or rewind the clock.
#[inline]
pub fn check_timestep(dt: f64) -> CoreResult<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidTimestep(dt))
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run configuration.
///
/// Floor contents (machines, products) are configured separately; this struct
/// only holds the knobs of the round loop itself.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Timestep used by `Sim::run` / `Sim::run_rounds`.  Default: 0.05 s,
    /// matching a 50 ms frame interval.
    pub dt: f64,

    /// Exponential approach rate for moving workpieces (1/s).  Each round a
    /// workpiece covers `min(1, move_rate * dt)` of its remaining distance.
    pub move_rate: f64,

    /// Per-axis distance at which a moving workpiece counts as arrived.
    pub arrival_tolerance: f64,

    /// Rounds a workpiece may wait for a machine before a starvation warning
    /// is emitted.  `0` disables the warning.
    pub starvation_rounds: u64,

    /// Upper bound on rounds for `Sim::run`.
    pub max_rounds: u64,

    /// Where every workpiece starts.
    pub spawn_position: Vec3,

    /// Emit a round summary to observers every N rounds.  `0` disables.
    pub summary_interval_rounds: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt:                      0.05,
            move_rate:               4.0,
            arrival_tolerance:       0.03,
            starvation_rounds:       200,
            max_rounds:              100_000,
            spawn_position:          Vec3::ZERO,
            summary_interval_rounds: 1,
        }
    }
}

impl SimConfig {
    /// Check that the loop parameters describe a run that can make progress.
    pub fn validate(&self) -> CoreResult<()> {
        check_timestep(self.dt)?;
        if !(self.move_rate.is_finite() && self.move_rate > 0.0) {
            return Err(CoreError::Config(format!(
                "move_rate must be positive, got {}",
                self.move_rate
            )));
        }
        if !(self.arrival_tolerance.is_finite() && self.arrival_tolerance > 0.0) {
            return Err(CoreError::Config(format!(
                "arrival_tolerance must be positive, got {}",
                self.arrival_tolerance
            )));
        }
        Ok(())
    }
}
