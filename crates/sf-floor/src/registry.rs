//! The `MachineRegistry` — every machine on the floor, grouped by category.
//!
//! Within a category machines are kept sorted by name, so
//! [`find_free`][MachineRegistry::find_free] is a deterministic first-fit scan:
//! two runs over the same floor always pick the same machine.

use log::debug;

use sf_core::{CategoryId, MachineId, Vec3, WorkpieceId};

use crate::{FloorError, FloorResult};

#[cfg(feature = "fx-hash")]
type NameMap<V> = rustc_hash::FxHashMap<String, V>;
#[cfg(not(feature = "fx-hash"))]
type NameMap<V> = std::collections::HashMap<String, V>;

/// Lower bound applied to machine speed before dividing by it.
pub const SPEED_EPSILON: f64 = 1e-6;

/// A machine and its reservation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    pub id:       MachineId,
    pub name:     String,
    pub category: CategoryId,
    pub position: Vec3,
    pub speed:    f64,

    /// Simulated time at which the current reservation expires.
    pub busy_until: f64,

    /// The workpiece holding this machine, from assignment until its
    /// processing finishes.
    pub occupant: Option<WorkpieceId>,
}

impl Machine {
    /// Free at `now`: the reservation has expired and nobody occupies it.
    #[inline]
    pub fn is_free(&self, now: f64) -> bool {
        self.busy_until <= now && self.occupant.is_none()
    }

    /// Actual processing time for a step of `base_duration` on this machine.
    #[inline]
    pub fn processing_time(&self, base_duration: f64) -> f64 {
        base_duration / self.speed.max(SPEED_EPSILON)
    }
}

/// All machines, indexed by id, by name, and by category.
#[derive(Debug, Default)]
pub struct MachineRegistry {
    machines:       Vec<Machine>,
    by_name:        NameMap<MachineId>,
    categories:     Vec<String>,
    category_index: NameMap<CategoryId>,
    /// `CategoryId → machines`, each list sorted by machine name.
    by_category:    Vec<Vec<MachineId>>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Return the id for `category`, creating it (with no machines) if new.
    pub fn intern_category(&mut self, category: &str) -> FloorResult<CategoryId> {
        if let Some(&id) = self.category_index.get(category) {
            return Ok(id);
        }
        let id = CategoryId::try_from(self.categories.len())
            .map_err(|_| FloorError::TooManyCategories)?;
        self.categories.push(category.to_owned());
        self.category_index.insert(category.to_owned(), id);
        self.by_category.push(Vec::new());
        Ok(id)
    }

    /// Add a machine.  Names are unique across the whole floor.
    pub fn register(
        &mut self,
        name:     &str,
        category: &str,
        position: Vec3,
        speed:    f64,
    ) -> FloorResult<MachineId> {
        if self.by_name.contains_key(name) {
            return Err(FloorError::DuplicateName(name.to_owned()));
        }
        let category_id = self.intern_category(category)?;
        let id = MachineId(self.machines.len() as u32);

        self.machines.push(Machine {
            id,
            name: name.to_owned(),
            category: category_id,
            position,
            speed,
            busy_until: 0.0,
            occupant: None,
        });
        self.by_name.insert(name.to_owned(), id);

        // Keep the category list in name order.
        let machines = &self.machines;
        let members = &mut self.by_category[category_id.index()];
        let slot = members
            .binary_search_by(|other| machines[other.index()].name.as_str().cmp(name))
            .unwrap_or_else(|insert_at| insert_at);
        members.insert(slot, id);

        debug!("registered {name:?} as {id} in category {category:?} at {position}");
        Ok(id)
    }

    // ── Scheduling ────────────────────────────────────────────────────────

    /// First machine of `category`, in name order, that is free at `now`.
    pub fn find_free(&self, category: CategoryId, now: f64) -> Option<MachineId> {
        self.by_category
            .get(category.index())?
            .iter()
            .copied()
            .find(|id| self.machines[id.index()].is_free(now))
    }

    /// Claim `machine` for `workpiece` for `duration` seconds from `now`.
    ///
    /// The caller must have seen the machine free via [`find_free`] in the
    /// same round.  Returns the new `busy_until`.
    ///
    /// [`find_free`]: Self::find_free
    pub fn reserve(
        &mut self,
        machine:   MachineId,
        workpiece: WorkpieceId,
        now:       f64,
        duration:  f64,
    ) -> FloorResult<f64> {
        let m = self
            .machines
            .get_mut(machine.index())
            .ok_or(FloorError::MachineNotFound(machine))?;
        debug_assert!(m.is_free(now), "{machine} reserved while busy");
        m.busy_until = now + duration;
        m.occupant = Some(workpiece);
        Ok(m.busy_until)
    }

    /// Hand `machine` back once `workpiece` has finished processing on it.
    ///
    /// A release by anyone other than the occupant is ignored.
    pub fn release(&mut self, machine: MachineId, workpiece: WorkpieceId) -> FloorResult<()> {
        let m = self
            .machines
            .get_mut(machine.index())
            .ok_or(FloorError::MachineNotFound(machine))?;
        if m.occupant == Some(workpiece) {
            m.occupant = None;
        }
        Ok(())
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    #[inline]
    pub fn get(&self, machine: MachineId) -> Option<&Machine> {
        self.machines.get(machine.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&Machine> {
        self.by_name.get(name).map(|id| &self.machines[id.index()])
    }

    /// Id of an existing category (never creates one).
    pub fn category_id(&self, category: &str) -> Option<CategoryId> {
        self.category_index.get(category).copied()
    }

    pub fn category_name(&self, category: CategoryId) -> Option<&str> {
        self.categories.get(category.index()).map(String::as_str)
    }

    /// Machines of `category` in name order (empty for unknown categories).
    pub fn machines_in(&self, category: CategoryId) -> &[MachineId] {
        self.by_category
            .get(category.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All category names, indexed by `CategoryId`.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Machines in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Machine> {
        self.machines.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
