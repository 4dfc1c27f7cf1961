use thiserror::Error;

use sf_core::MachineId;

#[derive(Debug, Error)]
pub enum FloorError {
    #[error("machine name {0:?} is registered twice")]
    DuplicateName(String),

    #[error("machine {name:?} has invalid speed {speed}")]
    InvalidSpeed { name: String, speed: f64 },

    #[error("product {product:?} step {step_index} has invalid duration {duration}")]
    InvalidDuration {
        product:    String,
        step_index: usize,
        duration:   f64,
    },

    #[error("machine {0} not found")]
    MachineNotFound(MachineId),

    #[error("more than {max} machine categories", max = u16::MAX)]
    TooManyCategories,
}

pub type FloorResult<T> = Result<T, FloorError>;

/// A route step that names a category no registered machine belongs to.
///
/// Never fatal: the step is dropped from the route and this value is
/// reported so the caller can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("product {product:?} step {step_index} references unknown category {category:?}")]
pub struct ConfigReferenceError {
    pub product:    String,
    pub step_index: usize,
    pub category:   String,
}
