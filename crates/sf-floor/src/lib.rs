//! `sf-floor` — what stands on the shop floor and what flows through it.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`config`]   | `FloorConfig` input types and their normalization                 |
//! | [`registry`] | `MachineRegistry` — machines grouped by category, first-fit lookup |
//! | [`layout`]   | `SlotLayout` — positions for machines that do not declare one     |
//! | [`load`]     | `LoadReport` — expected visits per machine from product demand    |
//! | [`error`]    | `FloorError`, `FloorResult<T>`, `ConfigReferenceError`            |
//!
//! # Normalization
//!
//! Configuration documents are loose: a machine may be a bare name or an
//! object, a route step may be a bare category or an object.  Everything is
//! normalized into [`MachineSpec`] / [`ProductSpec`] before the registry or
//! the simulation sees it.

pub mod config;
pub mod error;
pub mod layout;
pub mod load;
pub mod registry;


pub use config::{
    FloorConfig, MachineDecl, MachineSpec, ProductDecl, ProductSpec, StepDecl, StepSpec,
    DEFAULT_STEP_DURATION,
};
pub use error::{ConfigReferenceError, FloorError, FloorResult};
pub use layout::SlotLayout;
pub use load::{LoadReport, MachineLoad};
pub use registry::{Machine, MachineRegistry, SPEED_EPSILON};
