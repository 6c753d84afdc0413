use std::path::PathBuf;

use arrow::compute::concat_batches;
use arrow::ffi_stream::ArrowArrayStreamReader;
use arrow::pyarrow::FromPyArrow;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use gmtplot::{EngineConfig, Figure as RsFigure, OptionValue, Options, Table, HISTOGRAM};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pythonize::depythonize;
use tracing::info_span;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

#[pyclass]
pub struct Figure {
    inner: RsFigure,
}

#[pymethods]
impl Figure {
    #[new]
    #[pyo3(signature = (gmt=None, temp_dir=None))]
    fn new(gmt: Option<PathBuf>, temp_dir: Option<PathBuf>) -> Self {
        let mut config = EngineConfig::from_env();
        if let Some(gmt) = gmt {
            config.program = gmt;
        }
        if temp_dir.is_some() {
            config.temp_dir = temp_dir;
        }
        Self {
            inner: RsFigure::from_config(&config),
        }
    }

    /// Plot a histogram of a data file, a list of values, a list of rows, or an
    /// Arrow table (pyarrow RecordBatch or Table, or a dataframe exporting Arrow).
    ///
    /// Keyword arguments are histogram option names; run Figure.aliases() for the list.
    #[pyo3(signature = (table, **kwargs))]
    fn histogram(
        &self,
        py: Python<'_>,
        table: &Bound<'_, PyAny>,
        kwargs: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<()> {
        let table = extract_table(table)?;
        let options = match kwargs {
            Some(kwargs) => info_span!("depythonize").in_scope(|| extract_options(kwargs))?,
            None => Options::new(),
        };
        py.allow_threads(|| self.inner.histogram(&table, &options))?;
        Ok(())
    }

    /// Histogram option names with their GMT flags
    #[staticmethod]
    fn aliases() -> String {
        HISTOGRAM.aliases_doc()
    }
}

fn extract_table(table: &Bound<'_, PyAny>) -> PyResult<Table> {
    if let Ok(path) = table.extract::<PathBuf>() {
        Ok(Table::File(path))
    } else if let Ok(batch) = RecordBatch::from_pyarrow_bound(table) {
        Ok(Table::Batch(batch))
    } else if table.hasattr("__arrow_c_stream__")? {
        // pyarrow.Table, or any dataframe exporting an Arrow stream
        let reader = ArrowArrayStreamReader::from_pyarrow_bound(table)?;
        let schema = reader.schema();
        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        let batch = concat_batches(&schema, &batches)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        Ok(Table::Batch(batch))
    } else if let Ok(values) = table.extract::<Vec<f64>>() {
        Ok(Table::Vectors(vec![values]))
    } else if let Ok(rows) = table.extract::<Vec<Vec<f64>>>() {
        Ok(Table::Matrix(rows))
    } else {
        Err(PyTypeError::new_err(format!(
            "Unrecognized data type for table: {}",
            table.get_type().name()?
        )))
    }
}

/// Keyword arguments in call order. `None` values are skipped.
fn extract_options(kwargs: &Bound<'_, PyDict>) -> PyResult<Options> {
    let mut options = Options::new();
    for (key, value) in kwargs.iter() {
        if value.is_none() {
            continue;
        }
        let name: String = key.extract()?;
        let value: OptionValue = depythonize(&value)?;
        options.insert(name, value);
    }
    Ok(options)
}

#[pymodule]
fn _gmtplot(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Initialize logging controlled by RUST_LOG environment variable
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_span_events(FmtSpan::CLOSE))
        .with(EnvFilter::from_default_env())
        .try_init();

    m.add_class::<Figure>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
