//! Slot layouts — floor positions for machines that do not declare one.
//!
//! A layout maps a machine's declaration index to a slot centre.  The
//! `two_by_three` preset reproduces the reference floor: six tiles in two
//! rows of three,
//!
//! ```text
//!   0  1  2      y = +1.5
//!   3  4  5      y = -1.5
//! x: -3  0  3
//! ```
//!
//! with machine centres raised to stand on the tiles.

use log::debug;

use sf_core::Vec3;

use crate::MachineSpec;

/// Thickness of a floor tile.
pub const TILE_THICKNESS: f64 = 0.08;

/// Edge length of a standard (cubic) machine.
pub const MACHINE_HEIGHT: f64 = 1.6;

/// Centre height of a machine standing on a tile centred at z = 0.
pub const MACHINE_CENTER_Z: f64 = TILE_THICKNESS / 2.0 + MACHINE_HEIGHT / 2.0;

/// Tile rows on the reference floor.  Grids keep growing past them.
pub const REFERENCE_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotLayout {
    /// Slots along +x: `origin + (i * spacing, 0, 0)`.
    Linear { origin: Vec3, spacing: f64 },

    /// Row-major grid growing towards -y:
    /// `origin + (col * pitch_x, -row * pitch_y, 0)`.
    Grid {
        origin:  Vec3,
        columns: usize,
        pitch_x: f64,
        pitch_y: f64,
    },
}

impl SlotLayout {
    /// Machines in a row along the x axis, `spacing` apart, starting at the
    /// origin.
    pub fn linear(spacing: f64) -> Self {
        SlotLayout::Linear { origin: Vec3::ZERO, spacing }
    }

    /// The reference 2×3 tile floor.
    pub fn two_by_three() -> Self {
        SlotLayout::Grid {
            origin:  Vec3::new(-3.0, 1.5, MACHINE_CENTER_Z),
            columns: 3,
            pitch_x: 3.0,
            pitch_y: 3.0,
        }
    }

    /// Centre of slot `index`.
    pub fn slot(&self, index: usize) -> Vec3 {
        match *self {
            SlotLayout::Linear { origin, spacing } => {
                origin + Vec3::new(index as f64 * spacing, 0.0, 0.0)
            }
            SlotLayout::Grid { origin, columns, pitch_x, pitch_y } => {
                let columns = columns.max(1);
                let (row, col) = (index / columns, index % columns);
                origin + Vec3::new(col as f64 * pitch_x, -(row as f64) * pitch_y, 0.0)
            }
        }
    }

    /// Position for every machine: its declared position if it has one,
    /// otherwise the slot matching its declaration index.
    pub fn place(&self, machines: &[MachineSpec]) -> Vec<Vec3> {
        machines
            .iter()
            .enumerate()
            .map(|(i, m)| {
                m.position.unwrap_or_else(|| {
                    if let SlotLayout::Grid { columns, .. } = *self {
                        let tiles = REFERENCE_ROWS * columns.max(1);
                        if i >= tiles {
                            debug!(
                                "{:?} placed in slot {i}, beyond the {tiles} reference tiles",
                                m.name
                            );
                        }
                    }
                    self.slot(i)
                })
            })
            .collect()
    }
}

impl Default for SlotLayout {
    /// Four metres between machines, as on the reference load-view floor.
    fn default() -> Self {
        SlotLayout::linear(4.0)
    }
}
