//! CSV output backend.
//!
//! Creates five files in the output directory: `machines.csv`,
//! `assignments.csv`, `completions.csv`, `starvation.csv` and
//! `round_summaries.csv`.

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AssignmentRow, CompletionRow, MachineRow, OutputResult, RoundSummaryRow, StarvationRow};

pub struct CsvWriter {
    machines:    Writer<File>,
    assignments: Writer<File>,
    completions: Writer<File>,
    starvation:  Writer<File>,
    summaries:   Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the five CSV files and write their
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut machines = Writer::from_path(dir.join("machines.csv"))?;
        machines.write_record([
            "machine", "name", "category", "x", "y", "z", "speed", "load", "load_normalized",
        ])?;

        let mut assignments = Writer::from_path(dir.join("assignments.csv"))?;
        assignments.write_record([
            "round", "time", "workpiece", "product", "step_index", "machine", "duration", "busy_until",
        ])?;

        let mut completions = Writer::from_path(dir.join("completions.csv"))?;
        completions.write_record(["round", "time", "workpiece", "product", "steps"])?;

        let mut starvation = Writer::from_path(dir.join("starvation.csv"))?;
        starvation.write_record(["round", "time", "workpiece", "product", "category", "waited_rounds"])?;

        let mut summaries = Writer::from_path(dir.join("round_summaries.csv"))?;
        summaries.write_record(["round", "time", "waiting", "moving", "processing", "finished"])?;

        Ok(Self {
            machines,
            assignments,
            completions,
            starvation,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_machines(&mut self, rows: &[MachineRow]) -> OutputResult<()> {
        for row in rows {
            self.machines.write_record(&[
                row.machine.to_string(),
                row.name.clone(),
                row.category.clone(),
                row.x.to_string(),
                row.y.to_string(),
                row.z.to_string(),
                row.speed.to_string(),
                row.load.to_string(),
                row.load_normalized.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_assignment(&mut self, row: &AssignmentRow) -> OutputResult<()> {
        self.assignments.write_record(&[
            row.round.to_string(),
            row.time.to_string(),
            row.workpiece.to_string(),
            row.product.to_string(),
            row.step_index.to_string(),
            row.machine.to_string(),
            row.duration.to_string(),
            row.busy_until.to_string(),
        ])?;
        Ok(())
    }

    fn write_completion(&mut self, row: &CompletionRow) -> OutputResult<()> {
        self.completions.write_record(&[
            row.round.to_string(),
            row.time.to_string(),
            row.workpiece.to_string(),
            row.product.to_string(),
            row.steps.to_string(),
        ])?;
        Ok(())
    }

    fn write_starvation(&mut self, row: &StarvationRow) -> OutputResult<()> {
        self.starvation.write_record(&[
            row.round.to_string(),
            row.time.to_string(),
            row.workpiece.to_string(),
            row.product.to_string(),
            row.category.to_string(),
            row.waited_rounds.to_string(),
        ])?;
        Ok(())
    }

    fn write_round_summary(&mut self, row: &RoundSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.round.to_string(),
            row.time.to_string(),
            row.waiting.to_string(),
            row.moving.to_string(),
            row.processing.to_string(),
            row.finished.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.machines.flush()?;
        self.assignments.flush()?;
        self.completions.flush()?;
        self.starvation.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
