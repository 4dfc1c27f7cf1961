//! `sf-output` — event logs for shopfloor simulation runs.
//!
//! | File                   | One row per                                  |
//! |------------------------|----------------------------------------------|
//! | `machines.csv`         | machine, with position, speed and load       |
//! | `assignments.csv`      | machine claimed by a workpiece               |
//! | `completions.csv`      | workpiece that finished its route            |
//! | `starvation.csv`       | starvation warning                           |
//! | `round_summaries.csv`  | summarized round (see `summary_interval_rounds`) |
//!
//! [`CsvWriter`] implements [`OutputWriter`]; [`SimOutputObserver`] feeds any
//! writer from `sf_sim::SimObserver` callbacks.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sf_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! obs.record_floor(&sim.registry, &report.load);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AssignmentRow, CompletionRow, MachineRow, RoundSummaryRow, StarvationRow};
pub use writer::OutputWriter;
