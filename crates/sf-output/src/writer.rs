//! The `OutputWriter` trait.

use crate::{AssignmentRow, CompletionRow, MachineRow, OutputResult, RoundSummaryRow, StarvationRow};

/// A sink for simulation event rows.
///
/// Errors surface through [`SimOutputObserver::take_error`] when the writer
/// is driven by the observer.
///
/// [`SimOutputObserver::take_error`]: crate::SimOutputObserver::take_error
pub trait OutputWriter {
    fn write_machines(&mut self, rows: &[MachineRow]) -> OutputResult<()>;

    fn write_assignment(&mut self, row: &AssignmentRow) -> OutputResult<()>;

    fn write_completion(&mut self, row: &CompletionRow) -> OutputResult<()>;

    fn write_starvation(&mut self, row: &StarvationRow) -> OutputResult<()>;

    fn write_round_summary(&mut self, row: &RoundSummaryRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
