use std::path::PathBuf;

use arrow::array::RecordBatch;

/// Input data for a module call.
#[derive(Debug, Clone)]
pub enum Table {
    /// A file the engine reads directly
    File(PathBuf),
    /// Column vectors, one `Vec` per column
    Vectors(Vec<Vec<f64>>),
    /// Row-major values, one `Vec` per record
    Matrix(Vec<Vec<f64>>),
    /// A tabular structure with numeric columns
    Batch(RecordBatch),
}

impl Table {
    pub fn kind(&self) -> &'static str {
        match self {
            Table::File(_) => "file",
            Table::Vectors(_) => "vectors",
            Table::Matrix(_) => "matrix",
            Table::Batch(_) => "batch",
        }
    }
}

impl From<PathBuf> for Table {
    fn from(path: PathBuf) -> Self {
        Table::File(path)
    }
}

impl From<&str> for Table {
    fn from(path: &str) -> Self {
        Table::File(PathBuf::from(path))
    }
}

impl From<Vec<f64>> for Table {
    fn from(values: Vec<f64>) -> Self {
        Table::Vectors(vec![values])
    }
}

impl From<&[f64]> for Table {
    fn from(values: &[f64]) -> Self {
        Table::Vectors(vec![values.to_vec()])
    }
}

impl From<RecordBatch> for Table {
    fn from(batch: RecordBatch) -> Self {
        Table::Batch(batch)
    }
}
