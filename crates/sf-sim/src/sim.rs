//! The `Sim` struct and its round loop.

use log::{debug, info, warn};

use sf_core::{check_timestep, CategoryId, MachineId, ProductId, SimClock, SimConfig, WorkpieceId};
use sf_floor::MachineRegistry;

use crate::motion::approach_factor;
use crate::workpiece::AssignOutcome;
use crate::{
    AssignmentEvent, CompletionEvent, Renderer, RoundSummary, SimObserver, SimResult,
    StarvationWarning, Workpiece, WorkpieceState,
};

// ── Products ──────────────────────────────────────────────────────────────────

/// A route step resolved against the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStep {
    pub category:      CategoryId,
    /// Processing time on a speed-1.0 machine.
    pub base_duration: f64,
}

/// A product with its resolved route.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id:       ProductId,
    pub name:     String,
    pub quantity: u32,
    pub route:    Vec<RouteStep>,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<R>` holds all simulation state and drives the three-phase round (see
/// the crate docs).  Workpieces are stored in spawn order, which is also the
/// order the assignment phase visits them in.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Renderer> {
    /// Loop configuration (timestep, movement rate, limits, …).
    pub config: SimConfig,

    /// Current round and simulated time.  The only clock in the simulation.
    pub clock: SimClock,

    /// Machines and their reservations.
    pub registry: MachineRegistry,

    /// Products indexed by `ProductId`.
    pub products: Vec<Product>,

    /// Workpieces indexed by `WorkpieceId`.
    pub workpieces: Vec<Workpiece>,

    /// Receives draw requests for every visible change.
    pub renderer: R,
}

impl<R: Renderer> Sim<R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run with `config.dt` until every workpiece has finished or
    /// `config.max_rounds` rounds have been processed.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let dt = self.config.dt;
        while !self.is_complete() && self.clock.round.0 < self.config.max_rounds {
            self.advance(dt, observer)?;
        }

        let summary = self.summary();
        if self.is_complete() {
            info!(
                "all {} workpieces finished at {}",
                summary.finished, self.clock
            );
        } else {
            warn!(
                "stopped at {} with {} of {} workpieces unfinished",
                self.clock,
                summary.total() - summary.finished,
                summary.total()
            );
        }
        observer.on_sim_end(&self.clock);
        Ok(())
    }

    /// Run exactly `n` rounds of `config.dt` (ignores `max_rounds`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_rounds<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        let dt = self.config.dt;
        for _ in 0..n {
            self.advance(dt, observer)?;
        }
        Ok(())
    }

    /// Apply one round of `dt` simulated seconds.
    ///
    /// This is the entry point for an external clock driver.  Returns the
    /// state counts at the end of the round.
    pub fn advance<O: SimObserver>(&mut self, dt: f64, observer: &mut O) -> SimResult<RoundSummary> {
        check_timestep(dt)?;
        let round = self.clock.round;
        let now = self.clock.now;

        observer.on_round_start(round, now);

        self.processing_phase(dt, observer)?;
        self.assignment_phase(observer)?;
        self.movement_phase(dt);

        let summary = self.summary();
        self.clock.advance(dt);

        let interval = self.config.summary_interval_rounds;
        if interval > 0 && round.0.is_multiple_of(interval) {
            observer.on_round_end(&summary);
        }
        Ok(summary)
    }

    /// `true` once every workpiece is `Finished` (vacuously true when there
    /// are none).
    pub fn is_complete(&self) -> bool {
        self.workpieces.iter().all(Workpiece::is_finished)
    }

    /// State counts for the current population, stamped with the current
    /// clock.
    pub fn summary(&self) -> RoundSummary {
        let mut summary = RoundSummary {
            round: self.clock.round,
            time:  self.clock.now,
            ..RoundSummary::default()
        };
        for wp in &self.workpieces {
            match wp.state {
                WorkpieceState::NeedAssign => summary.waiting += 1,
                WorkpieceState::Moving     => summary.moving += 1,
                WorkpieceState::Processing => summary.processing += 1,
                WorkpieceState::Finished   => summary.finished += 1,
            }
        }
        summary
    }

    #[inline]
    pub fn workpiece(&self, id: WorkpieceId) -> Option<&Workpiece> {
        self.workpieces.get(id.index())
    }

    #[inline]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(id.index())
    }

    /// Display label for a workpiece, e.g. `"shaft#2 moving"`.
    pub fn label(&self, id: WorkpieceId) -> String {
        match self.workpiece(id) {
            Some(wp) => workpiece_label(&self.products, wp),
            None => id.to_string(),
        }
    }

    // ── Phases ────────────────────────────────────────────────────────────

    /// Phase ①: spend `dt` on every processing workpiece; release machines
    /// whose step completed.
    fn processing_phase<O: SimObserver>(&mut self, dt: f64, observer: &mut O) -> SimResult<()> {
        let round = self.clock.round;
        let now = self.clock.now;
        // Explicit field borrows so the borrow checker sees disjoint access.
        let products = self.products.as_slice();
        let registry = &mut self.registry;
        let renderer = &mut self.renderer;

        for wp in self.workpieces.iter_mut() {
            if wp.state != WorkpieceState::Processing {
                continue;
            }
            let route_len = products[wp.product.index()].route.len();
            let Some(done) = wp.advance_processing(dt, route_len, registry)? else {
                continue;
            };

            if let Some(machine) = done.machine {
                draw_machine(registry, renderer, machine, false);
            }
            renderer.draw_workpiece(wp.id, wp.position, &workpiece_label(products, wp));

            if done.finished {
                let event = CompletionEvent {
                    round,
                    time:      now,
                    workpiece: wp.id,
                    product:   wp.product,
                    steps:     wp.step_index,
                };
                debug!("{round} t={now:.3}: {} finished", workpiece_label(products, wp));
                observer.on_finished(&event);
            }
        }
        Ok(())
    }

    /// Phase ②: visit waiting workpieces in spawn order and hand out free
    /// machines first-fit.
    fn assignment_phase<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let round = self.clock.round;
        let now = self.clock.now;
        let starvation_rounds = self.config.starvation_rounds;
        let products = self.products.as_slice();
        let registry = &mut self.registry;
        let renderer = &mut self.renderer;

        for wp in self.workpieces.iter_mut() {
            if wp.state != WorkpieceState::NeedAssign {
                continue;
            }
            let route = products[wp.product.index()].route.as_slice();
            let step_index = wp.step_index;

            match wp.try_assign(route, registry, now)? {
                AssignOutcome::Finished => {
                    let event = CompletionEvent {
                        round,
                        time:      now,
                        workpiece: wp.id,
                        product:   wp.product,
                        steps:     wp.step_index,
                    };
                    debug!("{round} t={now:.3}: {} finished", workpiece_label(products, wp));
                    renderer.draw_workpiece(wp.id, wp.position, &workpiece_label(products, wp));
                    observer.on_finished(&event);
                }

                AssignOutcome::Waiting => {
                    if starvation_rounds > 0
                        && wp.waiting_rounds > starvation_rounds
                        && !wp.starvation_reported
                    {
                        wp.starvation_reported = true;
                        let category = route[step_index].category;
                        let warning = StarvationWarning {
                            round,
                            time: now,
                            workpiece: wp.id,
                            product: wp.product,
                            category,
                            waited_rounds: wp.waiting_rounds,
                        };
                        warn!(
                            "{round} t={now:.3}: {} has waited {} rounds for a {:?} machine ({} registered)",
                            workpiece_label(products, wp),
                            wp.waiting_rounds,
                            registry.category_name(category).unwrap_or("?"),
                            registry.machines_in(category).len(),
                        );
                        observer.on_starvation(&warning);
                    }
                }

                AssignOutcome::Assigned { machine, duration, busy_until } => {
                    let event = AssignmentEvent {
                        round,
                        time: now,
                        workpiece: wp.id,
                        product: wp.product,
                        step_index,
                        machine,
                        duration,
                        busy_until,
                    };
                    debug!(
                        "{round} t={now:.3}: {} assigned to {} for {duration:.3}s",
                        workpiece_label(products, wp),
                        registry.get(machine).map_or("?", |m| m.name.as_str()),
                    );
                    draw_machine(registry, renderer, machine, true);
                    renderer.draw_workpiece(wp.id, wp.position, &workpiece_label(products, wp));
                    observer.on_assigned(&event);
                }
            }
        }
        Ok(())
    }

    /// Phase ③: move every moving workpiece towards its machine.
    fn movement_phase(&mut self, dt: f64) {
        let factor = approach_factor(self.config.move_rate, dt);
        let tolerance = self.config.arrival_tolerance;
        let products = self.products.as_slice();
        let renderer = &mut self.renderer;

        for wp in self.workpieces.iter_mut() {
            if wp.state != WorkpieceState::Moving {
                continue;
            }
            wp.advance_motion(factor, tolerance);
            renderer.draw_workpiece(wp.id, wp.position, &workpiece_label(products, wp));
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn workpiece_label(products: &[Product], wp: &Workpiece) -> String {
    let name = products
        .get(wp.product.index())
        .map_or("?", |p| p.name.as_str());
    format!("{name}#{} {}", wp.serial, wp.state)
}

pub(crate) fn draw_machine<R: Renderer>(
    registry: &MachineRegistry,
    renderer: &mut R,
    machine:  MachineId,
    busy:     bool,
) {
    if let Some(m) = registry.get(machine) {
        let label = format!("{} {}", m.name, if busy { "busy" } else { "idle" });
        renderer.draw_machine(machine, m.position, busy, &label);
    }
}
