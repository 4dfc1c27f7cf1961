//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use log::error;

use sf_core::SimClock;
use sf_floor::{LoadReport, MachineRegistry};
use sf_sim::{AssignmentEvent, CompletionEvent, RoundSummary, SimObserver, StarvationWarning};

use crate::row::{AssignmentRow, CompletionRow, MachineRow, RoundSummaryRow, StarvationRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes every event to an [`OutputWriter`].
///
/// `SimObserver` methods cannot fail, so the first write error is kept and
/// later writes still go ahead.  Check [`take_error`][Self::take_error] after
/// `sim.run()` returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Write one row per registered machine, with its expected load.
    pub fn record_floor(&mut self, registry: &MachineRegistry, load: &LoadReport) {
        let rows: Vec<MachineRow> = registry
            .iter()
            .map(|m| {
                let (load, load_normalized) =
                    load.get(m.id).map_or((0.0, 0.0), |l| (l.load, l.normalized));
                MachineRow {
                    machine:  m.id.0,
                    name:     m.name.clone(),
                    category: registry.category_name(m.category).unwrap_or_default().to_owned(),
                    x:        m.position.x,
                    y:        m.position.y,
                    z:        m.position.z,
                    speed:    m.speed,
                    load,
                    load_normalized,
                }
            })
            .collect();
        let result = self.writer.write_machines(&rows);
        self.store_err(result);
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                error!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_assigned(&mut self, event: &AssignmentEvent) {
        let result = self.writer.write_assignment(&AssignmentRow::from(event));
        self.store_err(result);
    }

    fn on_finished(&mut self, event: &CompletionEvent) {
        let result = self.writer.write_completion(&CompletionRow::from(event));
        self.store_err(result);
    }

    fn on_starvation(&mut self, warning: &StarvationWarning) {
        let result = self.writer.write_starvation(&StarvationRow::from(warning));
        self.store_err(result);
    }

    fn on_round_end(&mut self, summary: &RoundSummary) {
        let result = self.writer.write_round_summary(&RoundSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _clock: &SimClock) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
