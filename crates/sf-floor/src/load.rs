//! Expected machine load from product demand.
//!
//! Each route step contributes the product's quantity to its category; a
//! category's total is shared evenly between its machines.  Steps naming an
//! unknown category contribute nothing.  `normalized` maps the lowest machine
//! load to 0.0 and the highest to 1.0 — suitable for a cold-to-hot colour
//! ramp in whatever renderer consumes it.

use sf_core::MachineId;

use crate::{MachineRegistry, ProductSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct MachineLoad {
    pub machine:    MachineId,
    pub load:       f64,
    /// `load` rescaled into `[0.0, 1.0]` across all machines.
    pub normalized: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// One entry per machine, in registration order.
    pub machines: Vec<MachineLoad>,
    pub min:      f64,
    pub max:      f64,
}

impl LoadReport {
    pub fn compute(registry: &MachineRegistry, products: &[ProductSpec]) -> Self {
        let mut by_category = vec![0.0_f64; registry.categories().len()];
        for product in products {
            let quantity = f64::from(product.quantity);
            for step in &product.route {
                if let Some(category) = registry.category_id(&step.category) {
                    by_category[category.index()] += quantity;
                }
            }
        }

        let loads: Vec<(MachineId, f64)> = registry
            .iter()
            .map(|m| {
                let sharing = registry.machines_in(m.category).len().max(1) as f64;
                (m.id, by_category[m.category.index()] / sharing)
            })
            .collect();

        let min = loads.iter().map(|&(_, l)| l).fold(f64::INFINITY, f64::min);
        let max = loads.iter().map(|&(_, l)| l).fold(f64::NEG_INFINITY, f64::max);
        let (min, max) = if loads.is_empty() { (0.0, 0.0) } else { (min, max) };

        // Flat loads would divide by zero; stretch the range instead.
        let span = if max == min { 1.0 } else { max - min };

        let machines = loads
            .into_iter()
            .map(|(machine, load)| MachineLoad {
                machine,
                load,
                normalized: (load - min) / span,
            })
            .collect();

        Self { machines, min, max }
    }

    pub fn get(&self, machine: MachineId) -> Option<&MachineLoad> {
        self.machines.get(machine.index())
    }
}
