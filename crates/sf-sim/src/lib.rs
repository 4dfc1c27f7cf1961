//! `sf-sim` — round loop orchestrator for the shopfloor simulation framework.
//!
//! # Three-phase round
//!
//! ```text
//! advance(dt) at simulated time `now`:
//!   ① Processing — every Processing workpiece: remaining -= dt; on
//!                  completion release the machine and move the route cursor.
//!   ② Assignment — every NeedAssign workpiece, ascending WorkpieceId:
//!                  first free machine of the step's category → Moving.
//!   ③ Movement   — every Moving workpiece approaches its machine; arrival
//!                  → Processing.
//!   now += dt
//! ```
//!
//! Phase ① runs before phase ② so a machine released in round T can be
//! claimed in round T.
//!
//! # Collaborators
//!
//! | Trait            | Role                                                   |
//! |------------------|--------------------------------------------------------|
//! | [`Renderer`]     | Receives "draw X at P with label L" requests           |
//! | [`SimObserver`]  | Receives assignment / completion / starvation events   |
//!
//! Both have no-op implementations, so the core runs headless in tests.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sf_core::SimConfig;
//! use sf_floor::{MachineSpec, ProductSpec, StepSpec};
//! use sf_sim::{NoopObserver, NoopRenderer, SimBuilder};
//!
//! let (mut sim, report) = SimBuilder::new(SimConfig::default(), NoopRenderer)
//!     .machine(MachineSpec::new("lathe-a", "lathe"))
//!     .product(ProductSpec { name: "shaft".into(), quantity: 2,
//!                            route: vec![StepSpec::new("lathe", 2.0)] })
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod motion;
pub mod observer;
pub mod render;
pub mod sim;
pub mod workpiece;

#[cfg(test)]
mod tests;

pub use builder::{BuildReport, SimBuilder};
pub use error::{SimError, SimResult};
pub use events::{AssignmentEvent, CompletionEvent, RoundSummary, StarvationWarning};
pub use observer::{NoopObserver, SimObserver};
pub use render::{NoopRenderer, Renderer};
pub use sim::{Product, RouteStep, Sim};
pub use workpiece::{Workpiece, WorkpieceState};
