//! Simulation observer trait for progress reporting and data collection.

use sf_core::{Round, SimClock};

use crate::{AssignmentEvent, CompletionEvent, RoundSummary, StarvationWarning};

/// Callbacks invoked by [`Sim::advance`][crate::Sim::advance] at key points of
/// the round loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — completion counter
///
/// ```rust,ignore
/// struct Done(usize);
///
/// impl SimObserver for Done {
///     fn on_finished(&mut self, _event: &CompletionEvent) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each round, before any phase runs.
    fn on_round_start(&mut self, _round: Round, _time: f64) {}

    /// A workpiece claimed a machine (assignment phase).
    fn on_assigned(&mut self, _event: &AssignmentEvent) {}

    /// A workpiece completed its route.
    fn on_finished(&mut self, _event: &CompletionEvent) {}

    /// A workpiece has been waiting too long for a machine.
    fn on_starvation(&mut self, _warning: &StarvationWarning) {}

    /// Called after the movement phase, every
    /// `config.summary_interval_rounds` rounds.
    fn on_round_end(&mut self, _summary: &RoundSummary) {}

    /// Called once when [`Sim::run`][crate::Sim::run] returns.
    fn on_sim_end(&mut self, _clock: &SimClock) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
