use arrow::datatypes::DataType;
use thiserror::Error;

#[cfg(feature = "pyo3")]
use pyo3::{exceptions::PyValueError, PyErr};

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Table has no data")]
    EmptyTable,

    #[error("Column length mismatch at index {index}: expected {expected} values, found {found}")]
    MismatchedColumns {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Column '{column}' has unsupported type {data_type}; only numeric columns can be staged")]
    UnsupportedColumnType { column: String, data_type: DataType },

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Failed to write staged table: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Module '{module}' failed (exit code {code:?}): {stderr}")]
    ModuleFailed {
        module: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid argument string: {0}")]
    InvalidArguments(String),
}

#[cfg(feature = "pyo3")]
impl From<StagingError> for PyErr {
    fn from(err: StagingError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(feature = "pyo3")]
impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
