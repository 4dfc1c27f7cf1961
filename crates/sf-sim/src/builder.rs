//! Fluent builder for constructing a [`Sim`].

use log::{info, warn};

use sf_core::{ProductId, SimClock, SimConfig, WorkpieceId};
use sf_floor::{
    ConfigReferenceError, FloorConfig, LoadReport, MachineRegistry, MachineSpec, ProductSpec,
    SlotLayout,
};

use crate::sim::draw_machine;
use crate::{Product, Renderer, RouteStep, Sim, SimResult, Workpiece};

/// What [`SimBuilder::build`] did, for the caller to surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub machines:   usize,
    pub products:   usize,
    pub workpieces: usize,
    /// Route steps dropped because no machine serves their category.
    pub reference_errors: Vec<ConfigReferenceError>,
    /// Expected visits per machine from the declared demand.
    pub load: LoadReport,
}

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — timestep, movement rate, limits, …
/// - `R: Renderer` — where draw requests go (e.g. [`NoopRenderer`][crate::NoopRenderer])
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                   |
/// |-------------------------|---------------------------|
/// | `.floor(&cfg)`          | —                         |
/// | `.machine(spec)`        | no machines               |
/// | `.product(spec)`        | no products               |
/// | `.layout(l)`            | `SlotLayout::default()`   |
/// | `.declare_category(c)`  | —                         |
///
/// # Example
///
/// ```rust,ignore
/// let (mut sim, report) = SimBuilder::new(config, NoopRenderer)
///     .floor(&floor_config)?
///     .layout(SlotLayout::two_by_three())
///     .build()?;
/// for err in &report.reference_errors {
///     eprintln!("{err}");
/// }
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Renderer> {
    config:     SimConfig,
    renderer:   R,
    machines:   Vec<MachineSpec>,
    products:   Vec<ProductSpec>,
    categories: Vec<String>,
    layout:     SlotLayout,
}

impl<R: Renderer> SimBuilder<R> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, renderer: R) -> Self {
        Self {
            config,
            renderer,
            machines:   Vec::new(),
            products:   Vec::new(),
            categories: Vec::new(),
            layout:     SlotLayout::default(),
        }
    }

    /// Add every machine and product of a configuration document, normalized.
    pub fn floor(mut self, floor: &FloorConfig) -> SimResult<Self> {
        let (machines, products) = floor.normalize()?;
        self.machines.extend(machines);
        self.products.extend(products);
        Ok(self)
    }

    pub fn machine(mut self, spec: MachineSpec) -> Self {
        self.machines.push(spec);
        self
    }

    pub fn product(mut self, spec: ProductSpec) -> Self {
        self.products.push(spec);
        self
    }

    /// How machines without a declared position are placed.
    pub fn layout(mut self, layout: SlotLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Make `category` known even if no machine belongs to it.
    ///
    /// Route steps naming it are then kept (and wait forever) instead of being
    /// dropped as reference errors.
    pub fn declare_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Validate inputs, register machines, resolve routes, spawn workpieces,
    /// and return a ready-to-run [`Sim`].
    ///
    /// # Errors
    ///
    /// Invalid loop configuration, a non-finite or negative machine speed or
    /// step duration, and duplicate machine names are fatal.
    /// Unknown route categories are not: see [`BuildReport::reference_errors`].
    pub fn build(self) -> SimResult<(Sim<R>, BuildReport)> {
        self.config.validate()?;
        for spec in &self.machines {
            spec.validate()?;
        }
        for spec in &self.products {
            spec.validate()?;
        }

        // ── Machines ──────────────────────────────────────────────────────
        let mut registry = MachineRegistry::new();
        let positions = self.layout.place(&self.machines);
        for (spec, position) in self.machines.iter().zip(positions) {
            registry.register(&spec.name, &spec.category, position, spec.speed)?;
        }
        for category in &self.categories {
            registry.intern_category(category)?;
        }

        // ── Routes ────────────────────────────────────────────────────────
        let mut reference_errors = Vec::new();
        let mut products = Vec::with_capacity(self.products.len());
        for (i, spec) in self.products.iter().enumerate() {
            let mut route = Vec::with_capacity(spec.route.len());
            for (step_index, step) in spec.route.iter().enumerate() {
                match registry.category_id(&step.category) {
                    Some(category) => route.push(RouteStep {
                        category,
                        base_duration: step.base_duration,
                    }),
                    None => {
                        let err = ConfigReferenceError {
                            product:  spec.name.clone(),
                            step_index,
                            category: step.category.clone(),
                        };
                        warn!("{err}; step skipped");
                        reference_errors.push(err);
                    }
                }
            }
            products.push(Product {
                id:       ProductId(i as u32),
                name:     spec.name.clone(),
                quantity: spec.quantity,
                route,
            });
        }

        // ── Workpieces ────────────────────────────────────────────────────
        let spawn = self.config.spawn_position;
        let mut workpieces = Vec::new();
        for product in &products {
            for serial in 0..product.quantity {
                let id = WorkpieceId(workpieces.len() as u32);
                workpieces.push(Workpiece::new(id, product.id, serial, spawn));
            }
        }

        let report = BuildReport {
            machines:   registry.len(),
            products:   products.len(),
            workpieces: workpieces.len(),
            reference_errors,
            load:       LoadReport::compute(&registry, &self.products),
        };
        info!(
            "floor built: {} machines in {} categories, {} products, {} workpieces, {} skipped steps",
            report.machines,
            registry.categories().len(),
            report.products,
            report.workpieces,
            report.reference_errors.len(),
        );

        let mut sim = Sim {
            config: self.config,
            clock: SimClock::new(),
            registry,
            products,
            workpieces,
            renderer: self.renderer,
        };
        sim.draw_all();

        Ok((sim, report))
    }
}

impl<R: Renderer> Sim<R> {
    /// Issue one draw request for every machine and workpiece.
    ///
    /// Called once after building so a renderer starts from a complete
    /// picture; the round loop only reports changes after that.
    pub fn draw_all(&mut self) {
        for m in self.registry.iter() {
            draw_machine(&self.registry, &mut self.renderer, m.id, m.occupant.is_some());
        }
        for i in 0..self.workpieces.len() {
            let id = self.workpieces[i].id;
            let position = self.workpieces[i].position;
            let label = self.label(id);
            self.renderer.draw_workpiece(id, position, &label);
        }
    }
}
