//! floor2x3 — six machines on the 2×3 tile floor.
//!
//! Three products share a saw, two lathes, a drill, a press and a paint booth.
//! The floor is declared as an embedded JSON document, laid out on the
//! reference 2×3 grid, and run headless: the renderer only traces draw
//! requests (`RUST_LOG=trace` to see them) and every event lands in CSV files
//! under `output/floor2x3`.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use log::{info, trace, warn};

use sf_core::{MachineId, SimClock, SimConfig, Vec3, WorkpieceId};
use sf_floor::{FloorConfig, SlotLayout};
use sf_output::{CsvWriter, OutputWriter, SimOutputObserver};
use sf_sim::{
    AssignmentEvent, CompletionEvent, Renderer, RoundSummary, SimBuilder, SimObserver,
    StarvationWarning,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR: &str = "output/floor2x3";
const DT:         f64  = 0.05; // 50 ms rounds

// ── Floor document ────────────────────────────────────────────────────────────

// Machines without a position take the next 2×3 slot in declaration order.
// "welder" is deliberately missing from the floor: its step is reported and
// skipped at build time.
const FLOOR_JSON: &str = r#"{
  "machines": [
    "saw",
    { "name": "lathe-a", "type": "lathe", "speed": 1.25 },
    { "name": "lathe-b", "type": "lathe", "speed": 0.8 },
    "drill",
    { "name": "press", "speed": 2.0 },
    { "name": "paint-booth", "type": "paint" }
  ],
  "products": [
    { "name": "shaft", "quantity": 4,
      "route": [ { "type": "saw", "duration": 1.5 },
                 { "type": "lathe", "duration": 3.0 },
                 { "machine": "drill", "duration": 1.0 } ] },
    { "name": "bracket", "quantity": 3,
      "route": [ { "type": "press", "duration": 2.0 },
                 { "type": "drill", "duration": 0.5 },
                 { "type": "welder", "duration": 2.0 },
                 { "type": "paint", "duration": 2.5 } ] },
    { "quantity": 2,
      "route": [ "saw", "paint" ] }
  ]
}"#;

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Traces every draw request and counts them.
#[derive(Default)]
struct LoggingRenderer {
    workpiece_draws: usize,
    machine_draws:   usize,
}

impl Renderer for LoggingRenderer {
    fn draw_workpiece(&mut self, workpiece: WorkpieceId, position: Vec3, label: &str) {
        self.workpiece_draws += 1;
        trace!("draw {workpiece} at {position}: {label}");
    }

    fn draw_machine(&mut self, machine: MachineId, position: Vec3, busy: bool, label: &str) {
        self.machine_draws += 1;
        trace!("draw {machine} at {position} busy={busy}: {label}");
    }
}

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:       SimOutputObserver<W>,
    assignments: usize,
    completions: usize,
    starvation:  usize,
    summaries:   usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, assignments: 0, completions: 0, starvation: 0, summaries: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_assigned(&mut self, event: &AssignmentEvent) {
        self.assignments += 1;
        self.inner.on_assigned(event);
    }

    fn on_finished(&mut self, event: &CompletionEvent) {
        self.completions += 1;
        self.inner.on_finished(event);
    }

    fn on_starvation(&mut self, warning: &StarvationWarning) {
        self.starvation += 1;
        self.inner.on_starvation(warning);
    }

    fn on_round_end(&mut self, summary: &RoundSummary) {
        self.summaries += 1;
        self.inner.on_round_end(summary);
    }

    fn on_sim_end(&mut self, clock: &SimClock) {
        self.inner.on_sim_end(clock);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    println!("=== floor2x3 — shopfloor simulation ===");
    println!();

    // 1. Parse the floor document.
    let floor: FloorConfig = serde_json::from_str(FLOOR_JSON)?;

    // 2. Loop configuration.
    let config = SimConfig {
        dt:                      DT,
        starvation_rounds:       600, // 30 s of waiting
        summary_interval_rounds: 20,  // once per simulated second
        ..SimConfig::default()
    };

    // 3. Build the floor and spawn workpieces.
    let (mut sim, report) = SimBuilder::new(config, LoggingRenderer::default())
        .floor(&floor)?
        .layout(SlotLayout::two_by_three())
        .build()?;
    println!(
        "Floor: {} machines, {} products, {} workpieces, {} skipped route steps",
        report.machines,
        report.products,
        report.workpieces,
        report.reference_errors.len()
    );
    println!();

    // 4. Expected load per machine.
    println!("{:<12} {:<8} {:>6} {:>8}  {:<24}", "Machine", "Type", "Speed", "Load", "Position");
    println!("{}", "-".repeat(64));
    for m in sim.registry.iter() {
        let load = report.load.get(m.id).map_or(0.0, |l| l.load);
        println!(
            "{:<12} {:<8} {:>6.2} {:>8.2}  {}",
            m.name,
            sim.registry.category_name(m.category).unwrap_or("?"),
            m.speed,
            load,
            m.position,
        );
    }
    println!();

    // 5. Output.
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut inner_obs = SimOutputObserver::new(writer);
    inner_obs.record_floor(&sim.registry, &report.load);
    let mut obs = CountingObserver::new(inner_obs);

    // 6. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        warn!("output error: {e}");
    }
    info!(
        "renderer saw {} workpiece and {} machine draws",
        sim.renderer.workpiece_draws, sim.renderer.machine_draws
    );

    // 7. Summary.
    println!("Simulation finished at {} in {:.3} s", sim.clock, elapsed.as_secs_f64());
    println!("  assignments.csv     : {} rows", obs.assignments);
    println!("  completions.csv     : {} rows", obs.completions);
    println!("  starvation.csv      : {} rows", obs.starvation);
    println!("  round_summaries.csv : {} rows", obs.summaries);
    println!();

    // 8. Final workpiece table.
    println!("{:<6} {:<22} {:>5}  {:<24}", "Id", "Workpiece", "Step", "Position");
    println!("{}", "-".repeat(60));
    for wp in &sim.workpieces {
        let route_len = sim.product(wp.product).map_or(0, |p| p.route.len());
        println!(
            "{:<6} {:<22} {:>2}/{:<2}  {}",
            wp.id.0,
            sim.label(wp.id),
            wp.step_index,
            route_len,
            wp.position,
        );
    }

    Ok(())
}
