//! Integration tests for sf-sim.

use sf_core::{MachineId, Round, SimClock, SimConfig, Vec3, WorkpieceId};
use sf_floor::{MachineSpec, ProductSpec, StepSpec};

use crate::{
    AssignmentEvent, CompletionEvent, NoopRenderer, Renderer, RoundSummary, Sim, SimBuilder,
    SimObserver, StarvationWarning,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(dt: f64) -> SimConfig {
    SimConfig {
        dt,
        starvation_rounds: 0,
        ..SimConfig::default()
    }
}

fn product(name: &str, quantity: u32, route: &[(&str, f64)]) -> ProductSpec {
    ProductSpec {
        name: name.into(),
        quantity,
        route: route.iter().map(|&(c, d)| StepSpec::new(c, d)).collect(),
    }
}

/// Observer that keeps every event.
#[derive(Default)]
struct Recorder {
    assigned:  Vec<AssignmentEvent>,
    finished:  Vec<CompletionEvent>,
    starving:  Vec<StarvationWarning>,
    summaries: Vec<RoundSummary>,
    starts:    usize,
    ended:     Option<SimClock>,
}

impl SimObserver for Recorder {
    fn on_round_start(&mut self, _round: Round, _time: f64) { self.starts += 1; }
    fn on_assigned(&mut self, e: &AssignmentEvent) { self.assigned.push(*e); }
    fn on_finished(&mut self, e: &CompletionEvent) { self.finished.push(*e); }
    fn on_starvation(&mut self, w: &StarvationWarning) { self.starving.push(*w); }
    fn on_round_end(&mut self, s: &RoundSummary) { self.summaries.push(*s); }
    fn on_sim_end(&mut self, clock: &SimClock) { self.ended = Some(clock.clone()); }
}

/// Renderer that keeps every draw request.
#[derive(Default)]
struct DrawLog {
    workpieces: Vec<(WorkpieceId, Vec3, String)>,
    machines:   Vec<(MachineId, bool, String)>,
}

impl Renderer for DrawLog {
    fn draw_workpiece(&mut self, workpiece: WorkpieceId, position: Vec3, label: &str) {
        self.workpieces.push((workpiece, position, label.to_owned()));
    }

    fn draw_machine(&mut self, machine: MachineId, _position: Vec3, busy: bool, label: &str) {
        self.machines.push((machine, busy, label.to_owned()));
    }
}

/// One press at the spawn point, so workpieces arrive in the round they are
/// assigned.
fn single_press(quantity: u32, duration: f64) -> Sim<NoopRenderer> {
    let (sim, _) = SimBuilder::new(test_config(0.5), NoopRenderer)
        .machine(MachineSpec::new("press-1", "press").at(Vec3::ZERO))
        .product(product("plate", quantity, &[("press", duration)]))
        .build()
        .unwrap();
    sim
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use sf_core::{CoreError, ProductId};
    use sf_floor::{FloorConfig, FloorError, MachineDecl, ProductDecl, SlotLayout, StepDecl};

    use super::*;
    use crate::{SimError, WorkpieceState};

    #[test]
    fn empty_floor_is_complete() {
        let (sim, report) = SimBuilder::new(SimConfig::default(), NoopRenderer).build().unwrap();
        assert!(sim.is_complete());
        assert_eq!(report.workpieces, 0);
    }

    #[test]
    fn spawns_one_workpiece_per_unit() {
        let (sim, report) = SimBuilder::new(SimConfig::default(), NoopRenderer)
            .machine(MachineSpec::new("saw", "saw"))
            .product(product("a", 3, &[("saw", 1.0)]))
            .product(product("b", 2, &[("saw", 1.0)]))
            .build()
            .unwrap();
        assert_eq!(report.workpieces, 5);
        assert_eq!(sim.workpieces[3].product, ProductId(1));
        assert_eq!(sim.workpieces[3].serial, 0);
        assert!(sim.workpieces.iter().all(|w| w.state == WorkpieceState::NeedAssign));
        assert_eq!(sim.label(WorkpieceId(1)), "a#1 waiting");
    }

    #[test]
    fn duplicate_machine_name_is_fatal() {
        let result = SimBuilder::new(SimConfig::default(), NoopRenderer)
            .machine(MachineSpec::new("saw", "saw"))
            .machine(MachineSpec::new("saw", "cutter"))
            .build();
        assert!(matches!(result, Err(SimError::Floor(FloorError::DuplicateName(_)))));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let config = SimConfig { dt: -1.0, ..SimConfig::default() };
        let result = SimBuilder::new(config, NoopRenderer).build();
        assert!(matches!(result, Err(SimError::Core(CoreError::InvalidTimestep(_)))));
    }

    #[test]
    fn non_finite_step_duration_is_fatal() {
        let result = SimBuilder::new(SimConfig::default(), NoopRenderer)
            .machine(MachineSpec::new("press-1", "press"))
            .product(product("bad", 1, &[("press", f64::NAN)]))
            .product(product("good", 1, &[("press", 1.0)]))
            .build();
        match result {
            Err(SimError::Floor(FloorError::InvalidDuration { product, step_index, .. })) => {
                assert_eq!(product, "bad");
                assert_eq!(step_index, 0);
            }
            Err(other) => panic!("expected InvalidDuration, got {other:?}"),
            Ok(_) => panic!("expected InvalidDuration, build succeeded"),
        }
    }

    #[test]
    fn negative_speed_is_fatal() {
        let result = SimBuilder::new(SimConfig::default(), NoopRenderer)
            .machine(MachineSpec::new("press-1", "press").with_speed(-3.0))
            .product(product("plate", 1, &[("press", 1.0)]))
            .build();
        assert!(matches!(
            result,
            Err(SimError::Floor(FloorError::InvalidSpeed { ref name, .. })) if name == "press-1"
        ));
    }

    #[test]
    fn unknown_category_step_is_skipped_and_reported() {
        let (sim, report) = SimBuilder::new(SimConfig::default(), NoopRenderer)
            .machine(MachineSpec::new("press-1", "press"))
            .product(product("plate", 1, &[("ghost", 1.0), ("press", 2.0)]))
            .build()
            .unwrap();

        assert_eq!(report.reference_errors.len(), 1);
        let err = &report.reference_errors[0];
        assert_eq!((err.product.as_str(), err.step_index, err.category.as_str()), ("plate", 0, "ghost"));

        let route = &sim.products[0].route;
        assert_eq!(route.len(), 1);
        assert_eq!(route[0].base_duration, 2.0);
    }

    #[test]
    fn declared_category_is_kept() {
        let (sim, report) = SimBuilder::new(SimConfig::default(), NoopRenderer)
            .declare_category("paint")
            .product(product("panel", 1, &[("paint", 1.0)]))
            .build()
            .unwrap();
        assert!(report.reference_errors.is_empty());
        assert_eq!(sim.products[0].route.len(), 1);
    }

    #[test]
    fn floor_config_is_normalized_and_placed() {
        let floor = FloorConfig {
            machines: vec![
                MachineDecl::Name("saw".into()),
                MachineDecl::Full {
                    name:     "lathe-a".into(),
                    category: Some("lathe".into()),
                    speed:    Some(2.0),
                    position: None,
                },
            ],
            products: vec![ProductDecl {
                name:     None,
                quantity: 2,
                route:    vec![
                    StepDecl::Category("saw".into()),
                    StepDecl::Full { category: "lathe".into(), duration: 3.0 },
                ],
            }],
        };

        let (sim, report) = SimBuilder::new(SimConfig::default(), NoopRenderer)
            .floor(&floor)
            .unwrap()
            .layout(SlotLayout::two_by_three())
            .build()
            .unwrap();

        assert_eq!(report.machines, 2);
        assert_eq!(sim.products[0].name, "product_0");
        let lathe = sim.registry.by_name("lathe-a").unwrap();
        assert_eq!(lathe.speed, 2.0);
        assert_eq!(lathe.position, SlotLayout::two_by_three().slot(1));
        // Each machine is visited once per unit.
        assert!(report.load.machines.iter().all(|m| m.load == 2.0));
    }

    #[test]
    fn initial_picture_is_drawn() {
        let (sim, _) = SimBuilder::new(SimConfig::default(), DrawLog::default())
            .machine(MachineSpec::new("press-1", "press"))
            .product(product("plate", 2, &[("press", 1.0)]))
            .build()
            .unwrap();
        assert_eq!(sim.renderer.machines, vec![(MachineId(0), false, "press-1 idle".to_owned())]);
        let labels: Vec<_> = sim.renderer.workpieces.iter().map(|(_, _, l)| l.as_str()).collect();
        assert_eq!(labels, ["plate#0 waiting", "plate#1 waiting"]);
    }
}

// ── Scheduling ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduling_tests {
    use sf_core::CoreError;

    use super::*;
    use crate::{SimError, WorkpieceState};

    #[test]
    fn second_workpiece_waits_for_the_only_machine() {
        let mut sim = single_press(2, 2.0);
        let mut obs = Recorder::default();

        sim.advance(0.5, &mut obs).unwrap();
        assert_eq!(obs.assigned.len(), 1);
        assert_eq!(obs.assigned[0].workpiece, WorkpieceId(0));
        assert_eq!(obs.assigned[0].busy_until, 2.0);
        assert_eq!(sim.workpieces[0].state, WorkpieceState::Processing);

        // t = 0.5, 1.0, 1.5: still blocked.
        for _ in 0..3 {
            sim.advance(0.5, &mut obs).unwrap();
            assert_eq!(sim.workpieces[1].state, WorkpieceState::NeedAssign);
        }

        // t = 2.0: the first finishes and the second takes over.
        sim.advance(0.5, &mut obs).unwrap();
        assert_eq!(obs.assigned.len(), 2);
        let second = obs.assigned[1];
        assert_eq!(second.workpiece, WorkpieceId(1));
        assert_eq!(second.machine, MachineId(0));
        assert_eq!(second.time, 2.0);
        assert_eq!(second.busy_until, 4.0);
        assert_eq!(obs.finished[0].workpiece, WorkpieceId(0));
        assert_eq!(obs.finished[0].round, second.round);
    }

    #[test]
    fn machine_freed_in_processing_phase_is_assigned_same_round() {
        // The first workpiece needs six rounds to reach the machine, so the
        // reservation (1.0 s) expires long before its processing ends.  The
        // machine only frees up when processing completes, and the waiting
        // workpiece must get it in that very round.
        let config = SimConfig { dt: 0.25, move_rate: 2.0, ..test_config(0.25) };
        let (mut sim, _) = SimBuilder::new(config, NoopRenderer)
            .machine(MachineSpec::new("press-1", "press").at(Vec3::new(1.0, 0.0, 0.0)))
            .product(product("plate", 2, &[("press", 1.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.run_rounds(12, &mut obs).unwrap();

        assert_eq!(obs.assigned.len(), 2);
        assert_eq!(obs.assigned[0].busy_until, 1.0);
        let done = obs.finished.iter().find(|e| e.workpiece == WorkpieceId(0)).unwrap();
        assert_eq!(done.round, Round(9));
        assert_eq!(obs.assigned[1].round, done.round);
        assert_eq!(obs.assigned[1].time, 2.25);
    }

    #[test]
    fn faster_machine_shortens_processing() {
        let (mut sim, _) = SimBuilder::new(test_config(0.5), NoopRenderer)
            .machine(MachineSpec::new("press-1", "press").with_speed(2.0))
            .product(product("plate", 1, &[("press", 4.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.advance(0.5, &mut obs).unwrap();
        assert_eq!(obs.assigned[0].duration, 2.0);
        assert_eq!(obs.assigned[0].busy_until, 2.0);
    }

    #[test]
    fn empty_route_finishes_in_first_round() {
        let (mut sim, _) = SimBuilder::new(test_config(0.5), NoopRenderer)
            .machine(MachineSpec::new("press-1", "press"))
            .product(product("blank", 1, &[]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.advance(0.5, &mut obs).unwrap();

        assert!(sim.is_complete());
        assert!(obs.assigned.is_empty());
        assert_eq!(obs.finished.len(), 1);
        assert_eq!(obs.finished[0].round, Round(0));
        assert_eq!(obs.finished[0].steps, 0);
        assert_eq!(sim.workpieces[0].machine, None);
        assert_eq!(sim.registry.get(MachineId(0)).unwrap().occupant, None);
    }

    #[test]
    fn first_fit_follows_machine_names() {
        let (mut sim, _) = SimBuilder::new(test_config(0.5), NoopRenderer)
            .machine(MachineSpec::new("lathe-b", "lathe"))
            .machine(MachineSpec::new("lathe-a", "lathe"))
            .product(product("shaft", 2, &[("lathe", 1.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.advance(0.5, &mut obs).unwrap();
        assert_eq!(obs.assigned[0].machine, sim.registry.by_name("lathe-a").unwrap().id);
        assert_eq!(obs.assigned[1].machine, sim.registry.by_name("lathe-b").unwrap().id);
    }

    #[test]
    fn busy_floor_keeps_exclusion_and_monotonic_cursors() {
        let config = SimConfig { move_rate: 1.5, ..test_config(0.25) };
        let (mut sim, _) = SimBuilder::new(config, NoopRenderer)
            .machine(MachineSpec::new("saw", "saw"))
            .machine(MachineSpec::new("lathe-a", "lathe").with_speed(1.5))
            .machine(MachineSpec::new("lathe-b", "lathe").with_speed(0.5))
            .machine(MachineSpec::new("press", "press"))
            .product(product("shaft", 4, &[("saw", 1.0), ("lathe", 2.0), ("press", 0.5)]))
            .product(product("gear", 3, &[("lathe", 1.0), ("saw", 0.75), ("lathe", 1.0)]))
            .build()
            .unwrap();

        let mut obs = Recorder::default();
        let mut cursors = vec![0usize; sim.workpieces.len()];
        let mut rounds = 0;
        while !sim.is_complete() {
            sim.advance(0.25, &mut obs).unwrap();
            rounds += 1;
            assert!(rounds < 10_000, "floor never drained");

            for wp in &sim.workpieces {
                let route_len = sim.products[wp.product.index()].route.len();
                assert!(wp.step_index >= cursors[wp.id.index()], "{} went backwards", wp.id);
                assert!(wp.step_index <= route_len);
                cursors[wp.id.index()] = wp.step_index;
            }
            for m in sim.registry.iter() {
                let holders = sim.workpieces.iter().filter(|w| w.machine == Some(m.id)).count();
                assert!(holders <= 1, "{} held by {holders} workpieces", m.name);
            }
        }

        assert_eq!(obs.finished.len(), 7);
        assert_eq!(obs.assigned.len(), 4 * 3 + 3 * 3);

        // Reservation intervals on one machine never overlap.
        for m in sim.registry.iter() {
            let mut spans: Vec<_> = obs
                .assigned
                .iter()
                .filter(|e| e.machine == m.id)
                .map(|e| (e.time, e.busy_until))
                .collect();
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in spans.windows(2) {
                assert!(pair[1].0 >= pair[0].1, "{}: {:?} overlaps {:?}", m.name, pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn starving_workpiece_warns_once() {
        let config = SimConfig { starvation_rounds: 5, ..test_config(0.5) };
        let (mut sim, _) = SimBuilder::new(config, NoopRenderer)
            .declare_category("paint")
            .product(product("panel", 1, &[("paint", 1.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.run_rounds(20, &mut obs).unwrap();

        assert_eq!(obs.starving.len(), 1);
        let warning = obs.starving[0];
        assert_eq!(warning.round, Round(5));
        assert_eq!(warning.waited_rounds, 6);
        assert_eq!(Some(warning.category), sim.registry.category_id("paint"));
        assert_eq!(sim.workpieces[0].state, WorkpieceState::NeedAssign);
    }

    #[test]
    fn waiting_behind_a_long_job_also_warns() {
        let config = SimConfig { starvation_rounds: 3, ..test_config(0.5) };
        let (mut sim, _) = SimBuilder::new(config, NoopRenderer)
            .machine(MachineSpec::new("press-1", "press").at(Vec3::ZERO))
            .product(product("plate", 2, &[("press", 100.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.run_rounds(10, &mut obs).unwrap();
        assert_eq!(obs.starving.len(), 1);
        assert_eq!(obs.starving[0].workpiece, WorkpieceId(1));
    }

    #[test]
    fn invalid_timestep_rejected_without_side_effects() {
        let mut sim = single_press(1, 1.0);
        let mut obs = Recorder::default();
        for dt in [0.0, -0.5, f64::NAN] {
            let err = sim.advance(dt, &mut obs).unwrap_err();
            assert!(matches!(err, SimError::Core(CoreError::InvalidTimestep(_))));
        }
        assert_eq!(sim.clock, SimClock::new());
        assert_eq!(obs.starts, 0);
    }

    #[test]
    fn run_drains_the_floor() {
        let (mut sim, _) = SimBuilder::new(test_config(0.25), NoopRenderer)
            .machine(MachineSpec::new("lathe-a", "lathe"))
            .machine(MachineSpec::new("lathe-b", "lathe"))
            .machine(MachineSpec::new("saw", "saw"))
            .product(product("shaft", 4, &[("lathe", 1.0), ("saw", 0.5)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.run(&mut obs).unwrap();

        assert!(sim.is_complete());
        assert_eq!(obs.finished.len(), 4);
        assert_eq!(obs.ended.as_ref().map(|c| c.round), Some(sim.clock.round));
        assert_eq!(obs.summaries.len() as u64, sim.clock.round.0);
        let last = obs.summaries.last().unwrap();
        assert_eq!((last.finished, last.total()), (4, 4));
    }

    #[test]
    fn run_stops_at_max_rounds() {
        let config = SimConfig { max_rounds: 10, ..test_config(0.5) };
        let (mut sim, _) = SimBuilder::new(config, NoopRenderer)
            .declare_category("paint")
            .product(product("panel", 1, &[("paint", 1.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.run(&mut obs).unwrap();
        assert_eq!(sim.clock.round, Round(10));
        assert!(!sim.is_complete());
        assert!(obs.ended.is_some());
    }

    #[test]
    fn summary_interval_thins_round_end_calls() {
        let config = SimConfig { summary_interval_rounds: 4, ..test_config(0.5) };
        let (mut sim, _) = SimBuilder::new(config, NoopRenderer)
            .declare_category("paint")
            .product(product("panel", 1, &[("paint", 1.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();
        sim.run_rounds(10, &mut obs).unwrap();
        let rounds: Vec<_> = obs.summaries.iter().map(|s| s.round).collect();
        assert_eq!(rounds, [Round(0), Round(4), Round(8)]);
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod motion_tests {
    use super::*;
    use crate::motion::{approach, approach_factor, rounds_to_arrive};
    use crate::WorkpieceState;

    #[test]
    fn geometric_convergence_round_count() {
        // Distance shrinks by 0.8 per round: 10 * 0.8^26 ≈ 0.0302, 10 * 0.8^27 ≈ 0.0242.
        let n = rounds_to_arrive(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 4.0, 0.05, 0.03, 1_000);
        assert_eq!(n, Some(27));
    }

    #[test]
    fn large_step_lands_on_target() {
        let target = Vec3::new(3.0, -1.5, 0.84);
        assert_eq!(approach_factor(4.0, 0.5), 1.0);
        assert_eq!(approach(Vec3::ZERO, target, 1.0), target);
        assert_eq!(rounds_to_arrive(Vec3::ZERO, target, 4.0, 0.5, 0.03, 10), Some(1));
    }

    #[test]
    fn limit_respected() {
        let n = rounds_to_arrive(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 4.0, 0.05, 0.03, 20);
        assert_eq!(n, None);
    }

    #[test]
    fn workpiece_arrives_after_27_rounds() {
        let config = SimConfig { dt: 0.05, move_rate: 4.0, ..test_config(0.05) };
        let (mut sim, _) = SimBuilder::new(config, NoopRenderer)
            .machine(MachineSpec::new("press-1", "press").at(Vec3::new(10.0, 0.0, 0.0)))
            .product(product("plate", 1, &[("press", 1.0)]))
            .build()
            .unwrap();
        let mut obs = Recorder::default();

        sim.run_rounds(26, &mut obs).unwrap();
        assert_eq!(sim.workpieces[0].state, WorkpieceState::Moving);
        let x = sim.workpieces[0].position.x;
        assert!(x > 9.96 && x < 9.97, "x = {x}");

        sim.run_rounds(1, &mut obs).unwrap();
        assert_eq!(sim.workpieces[0].state, WorkpieceState::Processing);
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod render_tests {
    use super::*;

    #[test]
    fn assignment_and_release_are_drawn() {
        let (mut sim, _) = SimBuilder::new(test_config(0.5), DrawLog::default())
            .machine(MachineSpec::new("press-1", "press").at(Vec3::ZERO))
            .product(product("plate", 1, &[("press", 0.5)]))
            .build()
            .unwrap();
        sim.renderer = DrawLog::default();
        let mut obs = Recorder::default();

        sim.advance(0.5, &mut obs).unwrap();
        assert_eq!(sim.renderer.machines, vec![(MachineId(0), true, "press-1 busy".to_owned())]);
        let labels: Vec<_> = sim.renderer.workpieces.iter().map(|(_, _, l)| l.as_str()).collect();
        assert_eq!(labels, ["plate#0 moving", "plate#0 processing"]);

        sim.advance(0.5, &mut obs).unwrap();
        assert_eq!(sim.renderer.machines.last().unwrap(), &(MachineId(0), false, "press-1 idle".to_owned()));
        assert_eq!(sim.renderer.workpieces.last().unwrap().2, "plate#0 finished");
    }

    #[test]
    fn borrowed_renderer_works() {
        let mut log = DrawLog::default();
        {
            let (mut sim, _) = SimBuilder::new(test_config(0.5), &mut log)
                .machine(MachineSpec::new("press-1", "press"))
                .product(product("plate", 1, &[("press", 0.5)]))
                .build()
                .unwrap();
            sim.run(&mut Recorder::default()).unwrap();
        }
        assert!(log.workpieces.iter().any(|(_, _, l)| l == "plate#0 finished"));
    }
}
