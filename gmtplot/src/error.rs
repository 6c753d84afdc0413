use gmtplot_common::ValueKind;
use gmtplot_session::{EngineError, StagingError};
use thiserror::Error;

#[cfg(feature = "pyo3")]
use pyo3::{exceptions::PyValueError, PyErr};

#[derive(Error, Debug)]
pub enum GmtPlotError {
    #[error("Unsupported option '{name}' for module '{module}'")]
    UnsupportedOption { name: String, module: String },

    #[error("Option '{name}' expects {expected}, got {found}")]
    InvalidOptionValue {
        name: String,
        expected: String,
        found: ValueKind,
    },

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(feature = "pyo3")]
impl From<GmtPlotError> for PyErr {
    fn from(err: GmtPlotError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
