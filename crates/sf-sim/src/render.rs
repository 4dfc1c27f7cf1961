//! The renderer seam.
//!
//! The simulation never owns scene state.  Whenever a workpiece moves or
//! changes state, or a machine is claimed or released, the round loop asks the
//! renderer to draw the object at its current place with a short label.  A
//! renderer is free to ignore any request; the simulation does not depend on
//! it.

use sf_core::{MachineId, Vec3, WorkpieceId};

pub trait Renderer {
    /// Show `workpiece` at `position`.  `label` reads like `"shaft#2 moving"`.
    fn draw_workpiece(&mut self, workpiece: WorkpieceId, position: Vec3, label: &str);

    /// Show `machine` as busy or idle.
    fn draw_machine(&mut self, _machine: MachineId, _position: Vec3, _busy: bool, _label: &str) {}
}

/// A [`Renderer`] that draws nothing.
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn draw_workpiece(&mut self, _workpiece: WorkpieceId, _position: Vec3, _label: &str) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw_workpiece(&mut self, workpiece: WorkpieceId, position: Vec3, label: &str) {
        (**self).draw_workpiece(workpiece, position, label);
    }

    fn draw_machine(&mut self, machine: MachineId, position: Vec3, busy: bool, label: &str) {
        (**self).draw_machine(machine, position, busy, label);
    }
}
