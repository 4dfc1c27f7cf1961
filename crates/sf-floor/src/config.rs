//! Floor configuration: declared machines and product routes.
//!
//! # Document shape
//!
//! ```json
//! {
//!   "machines": [
//!     "saw",
//!     { "name": "lathe-a", "type": "lathe", "speed": 1.5 },
//!     { "name": "lathe-b", "type": "lathe", "position": [0.0, 4.0, 0.8] }
//!   ],
//!   "products": [
//!     { "name": "shaft", "quantity": 3,
//!       "route": ["saw", { "type": "lathe", "duration": 4.0 }] }
//!   ]
//! }
//! ```
//!
//! A bare machine string is both the machine's name and its category.  A bare
//! route-step string is a category with [`DEFAULT_STEP_DURATION`].  Step
//! objects also accept `"machine"` or `"category"` in place of `"type"`.
//!
//! The `*Decl` types mirror the document; [`FloorConfig::normalize`] turns them
//! into the canonical `*Spec` records the rest of the framework accepts.

use serde::Deserialize;

use sf_core::Vec3;

use crate::{FloorError, FloorResult};

/// Processing time (simulated seconds) for route steps given as a bare
/// category name.
pub const DEFAULT_STEP_DURATION: f64 = 5.0;

fn default_duration() -> f64 {
    DEFAULT_STEP_DURATION
}

// ── Declarations (as written) ─────────────────────────────────────────────────

/// Top-level floor configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FloorConfig {
    #[serde(default)]
    pub machines: Vec<MachineDecl>,
    #[serde(default)]
    pub products: Vec<ProductDecl>,
}

/// A machine as declared: either a bare name or a full object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MachineDecl {
    Name(String),
    Full {
        name: String,
        #[serde(default, rename = "type", alias = "category")]
        category: Option<String>,
        #[serde(default)]
        speed: Option<f64>,
        #[serde(default)]
        position: Option<[f64; 3]>,
    },
}

/// A product as declared.  Missing names become `product_<index>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub route: Vec<StepDecl>,
}

/// A route step as declared: either a bare category or a full object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StepDecl {
    Category(String),
    Full {
        #[serde(rename = "type", alias = "machine", alias = "category")]
        category: String,
        #[serde(default = "default_duration")]
        duration: f64,
    },
}

// ── Canonical records ─────────────────────────────────────────────────────────

/// The one machine shape the registry accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSpec {
    pub name:     String,
    pub category: String,
    /// Processing-speed multiplier.  `0.0` is allowed; the registry guards the
    /// division with [`SPEED_EPSILON`][crate::SPEED_EPSILON].
    pub speed:    f64,
    /// Explicit floor position; `None` lets a [`SlotLayout`][crate::SlotLayout]
    /// place the machine.
    pub position: Option<Vec3>,
}

impl MachineSpec {
    /// A speed-1.0 machine with no fixed position.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name:     name.into(),
            category: category.into(),
            speed:    1.0,
            position: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Speed must be finite and non-negative.
    pub fn validate(&self) -> FloorResult<()> {
        if self.speed.is_finite() && self.speed >= 0.0 {
            Ok(())
        } else {
            Err(FloorError::InvalidSpeed { name: self.name.clone(), speed: self.speed })
        }
    }
}

/// One route entry: which category of machine, and for how long at speed 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSpec {
    pub category:      String,
    pub base_duration: f64,
}

impl StepSpec {
    pub fn new(category: impl Into<String>, base_duration: f64) -> Self {
        Self { category: category.into(), base_duration }
    }
}

/// A named route plus the number of workpieces to spawn for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSpec {
    pub name:     String,
    pub quantity: u32,
    pub route:    Vec<StepSpec>,
}

impl ProductSpec {
    /// Every step duration must be finite and non-negative.
    pub fn validate(&self) -> FloorResult<()> {
        match self
            .route
            .iter()
            .position(|s| !(s.base_duration.is_finite() && s.base_duration >= 0.0))
        {
            None => Ok(()),
            Some(step_index) => Err(FloorError::InvalidDuration {
                product: self.name.clone(),
                step_index,
                duration: self.route[step_index].base_duration,
            }),
        }
    }
}

// ── Normalization ─────────────────────────────────────────────────────────────

impl MachineDecl {
    /// Resolve the declaration into a [`MachineSpec`].
    ///
    /// The category defaults to the name; the speed defaults to `1.0` and
    /// must be finite and non-negative.
    pub fn normalize(&self) -> FloorResult<MachineSpec> {
        let spec = match self {
            MachineDecl::Name(name) => MachineSpec::new(name.clone(), name.clone()),
            MachineDecl::Full { name, category, speed, position } => MachineSpec {
                name:     name.clone(),
                category: category.clone().unwrap_or_else(|| name.clone()),
                speed:    speed.unwrap_or(1.0),
                position: position.map(Vec3::from),
            },
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl StepDecl {
    fn normalize(&self) -> StepSpec {
        match self {
            StepDecl::Category(category) => StepSpec::new(category.clone(), DEFAULT_STEP_DURATION),
            StepDecl::Full { category, duration } => StepSpec::new(category.clone(), *duration),
        }
    }
}

impl ProductDecl {
    /// Resolve the declaration into a [`ProductSpec`].  `index` is the
    /// product's position in the document, used for the fallback name.
    pub fn normalize(&self, index: usize) -> FloorResult<ProductSpec> {
        let name = self.name.clone().unwrap_or_else(|| format!("product_{index}"));
        let route = self.route.iter().map(StepDecl::normalize).collect();
        let spec = ProductSpec { name, quantity: self.quantity, route };
        spec.validate()?;
        Ok(spec)
    }
}

impl FloorConfig {
    /// Normalize every declaration.  Fails on the first invalid speed or
    /// duration; category references are checked later, against the registry.
    pub fn normalize(&self) -> FloorResult<(Vec<MachineSpec>, Vec<ProductSpec>)> {
        let machines = self
            .machines
            .iter()
            .map(MachineDecl::normalize)
            .collect::<FloorResult<Vec<_>>>()?;
        let products = self
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| p.normalize(i))
            .collect::<FloorResult<Vec<_>>>()?;
        Ok((machines, products))
    }
}
