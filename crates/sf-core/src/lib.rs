//! `sf-core` — foundational types for the shopfloor simulation framework.
//!
//! This crate is a dependency of every other `sf-*` crate.  It has no `sf-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module    | Contents                                                   |
//! |-----------|------------------------------------------------------------|
//! | [`ids`]   | `MachineId`, `WorkpieceId`, `ProductId`, `CategoryId`      |
//! | [`geo`]   | `Vec3` floor coordinates                                   |
//! | [`time`]  | `Round`, `SimClock`, `SimConfig`                           |
//! | [`error`] | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Vec3;
pub use ids::{CategoryId, MachineId, ProductId, WorkpieceId};
pub use time::{check_timestep, Round, SimClock, SimConfig};
