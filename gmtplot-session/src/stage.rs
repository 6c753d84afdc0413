use std::fmt::{Debug, Formatter};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray, RecordBatch};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

use crate::error::StagingError;
use crate::table::Table;

/// Makes a [`Table`] readable by the engine for the duration of one call.
pub trait DataStager: Send + Sync {
    fn stage(&self, table: &Table) -> Result<StagedTable, StagingError>;
}

enum Release {
    Nothing,
    TempFile(NamedTempFile),
    Callback(Box<dyn FnOnce() + Send>),
}

/// A staged table reference. Whatever backs the reference is released on drop.
pub struct StagedTable {
    reference: String,
    release: Release,
}

impl StagedTable {
    /// A reference to data the caller keeps alive, such as an existing file.
    pub fn borrowed(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            release: Release::Nothing,
        }
    }

    /// A temporary file removed when the handle drops.
    pub fn temp_file(file: NamedTempFile) -> Self {
        Self {
            reference: quote_reference(file.path()),
            release: Release::TempFile(file),
        }
    }

    /// A reference released by running `release` when the handle drops.
    pub fn with_release(reference: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            reference: reference.into(),
            release: Release::Callback(Box::new(release)),
        }
    }

    /// The text placed in front of the module's flags.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Keep whatever backs the reference instead of releasing it, and return the reference.
    /// A release callback is dropped without running.
    pub fn persist(mut self) -> Result<String, StagingError> {
        if let Release::TempFile(file) = std::mem::replace(&mut self.release, Release::Nothing) {
            file.keep().map_err(|err| StagingError::Io(err.error))?;
            debug!("Kept staged table {}", self.reference);
        }
        Ok(std::mem::take(&mut self.reference))
    }
}

impl Debug for StagedTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedTable")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl Drop for StagedTable {
    fn drop(&mut self) {
        match std::mem::replace(&mut self.release, Release::Nothing) {
            Release::Nothing => {}
            Release::TempFile(file) => {
                if let Err(err) = file.close() {
                    warn!("Failed to remove staged table {}: {err}", self.reference);
                } else {
                    debug!("Released staged table {}", self.reference);
                }
            }
            Release::Callback(release) => {
                release();
                debug!("Released staged table {}", self.reference);
            }
        }
    }
}

/// Stages in-memory tables as tab-separated temporary files; files pass through.
#[derive(Debug, Clone, Default)]
pub struct TempFileStager {
    dir: Option<PathBuf>,
}

impl TempFileStager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn create_file(&self) -> Result<NamedTempFile, StagingError> {
        let mut builder = Builder::new();
        builder.prefix("gmtplot-").suffix(".txt");
        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }

    fn write_rows<R>(&self, rows: impl Iterator<Item = R>) -> Result<StagedTable, StagingError>
    where
        R: Iterator<Item = f64>,
    {
        let mut file = self.create_file()?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            for row in rows {
                let line = row.map(|v| v.to_string()).collect::<Vec<_>>().join("\t");
                writeln!(writer, "{line}")?;
            }
            writer.flush()?;
        }
        Ok(StagedTable::temp_file(file))
    }

    fn write_columns(&self, columns: &[Vec<f64>]) -> Result<StagedTable, StagingError> {
        let len = uniform_len(columns)?;
        self.write_rows((0..len).map(move |i| columns.iter().map(move |c| c[i])))
    }
}

impl DataStager for TempFileStager {
    #[tracing::instrument(skip_all, fields(kind = table.kind()))]
    fn stage(&self, table: &Table) -> Result<StagedTable, StagingError> {
        let staged = match table {
            Table::File(path) => StagedTable::borrowed(quote_reference(path)),
            Table::Vectors(columns) => self.write_columns(columns)?,
            Table::Matrix(rows) => {
                uniform_len(rows)?;
                self.write_rows(rows.iter().map(|r| r.iter().copied()))?
            }
            Table::Batch(batch) => self.write_columns(&numeric_columns(batch)?)?,
        };
        debug!("Staged table as {}", staged.reference());
        Ok(staged)
    }
}

/// Length shared by every entry of `values`.
fn uniform_len(values: &[Vec<f64>]) -> Result<usize, StagingError> {
    let expected = values.first().map(|v| v.len()).unwrap_or(0);
    if expected == 0 {
        return Err(StagingError::EmptyTable);
    }
    for (index, v) in values.iter().enumerate() {
        if v.len() != expected {
            return Err(StagingError::MismatchedColumns {
                index,
                expected,
                found: v.len(),
            });
        }
    }
    Ok(expected)
}

fn numeric_columns(batch: &RecordBatch) -> Result<Vec<Vec<f64>>, StagingError> {
    let schema = batch.schema();
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        if !column.data_type().is_numeric() {
            return Err(StagingError::UnsupportedColumnType {
                column: field.name().clone(),
                data_type: column.data_type().clone(),
            });
        }
        let values = cast(column, &DataType::Float64)?;
        let values = values.as_primitive::<Float64Type>();
        columns.push(
            (0..values.len())
                .map(|i| {
                    if values.is_null(i) {
                        f64::NAN
                    } else {
                        values.value(i)
                    }
                })
                .collect(),
        );
    }
    Ok(columns)
}

/// Quote `path` so that [`split_args`](crate::engine::split_args) reads it back as one argument.
fn quote_reference(path: &Path) -> String {
    let reference = path.display().to_string();
    let needs_quotes =
        reference.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'');
    if !needs_quotes {
        reference
    } else if !reference.contains('"') {
        format!("\"{reference}\"")
    } else if !reference.contains('\'') {
        format!("'{reference}'")
    } else {
        // Both quote characters: single-quote the runs between `'`, double-quote each `'`
        reference
            .split('\'')
            .map(|run| format!("'{run}'"))
            .collect::<Vec<_>>()
            .join("\"'\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_uniform_len() {
        assert_eq!(uniform_len(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap(), 2);
        assert!(matches!(uniform_len(&[]), Err(StagingError::EmptyTable)));
        assert!(matches!(
            uniform_len(&[vec![1.0], vec![1.0, 2.0]]),
            Err(StagingError::MismatchedColumns {
                index: 1,
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_quote_reference() {
        assert_eq!(quote_reference(Path::new("/data/a.txt")), "/data/a.txt");
        assert_eq!(quote_reference(Path::new("/my data/a.txt")), "\"/my data/a.txt\"");
    }

    #[rstest::rstest]
    #[case("/data/a.txt")]
    #[case("/my data/a.txt")]
    #[case("/data/bob's.txt")]
    #[case("/data/say\"hi\".txt")]
    #[case("/data/bob's \"best\" values.txt")]
    fn test_quoted_reference_splits_back_to_path(#[case] path: &str) {
        let argv = crate::engine::split_args(&quote_reference(Path::new(path))).unwrap();
        assert_eq!(argv, vec![path.to_string()]);
    }

    #[test]
    fn test_quote_reference_avoids_quote_in_path() {
        assert_eq!(quote_reference(Path::new("/data/bob's.txt")), "\"/data/bob's.txt\"");
        assert_eq!(quote_reference(Path::new("/data/a\"b.txt")), "'/data/a\"b.txt'");
    }

    #[test]
    fn test_release_callback_runs_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let staged = StagedTable::with_release("@virtual", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(staged.reference(), "@virtual");
        assert_eq!(released.load(Ordering::SeqCst), 0);
        drop(staged);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
