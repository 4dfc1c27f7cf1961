use sf_core::CoreError;
use sf_floor::FloorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("floor error: {0}")]
    Floor(#[from] FloorError),
}

pub type SimResult<T> = Result<T, SimError>;
