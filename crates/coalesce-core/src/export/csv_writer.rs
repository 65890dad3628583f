//! CSV output for record batches

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use coalesce_domain::RecordBatch;

use crate::error::ExportError;

/// Writes a [`RecordBatch`] as CSV, optionally restricted to a column
/// subset and with output headers renamed.
pub struct CsvWriter {
    delimiter: u8,
    columns: Option<Vec<String>>,
    renames: Vec<(String, String)>,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self {
            delimiter: b',',
            columns: None,
            renames: Vec::new(),
        }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write only these columns, in this order.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Rename a column in the output header only.
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.push((from.into(), to.into()));
        self
    }

    /// Serialize the batch to a string.
    pub fn write_str(&self, batch: &RecordBatch) -> Result<String, ExportError> {
        let columns: Vec<String> = match &self.columns {
            Some(subset) => {
                for column in subset {
                    if !batch.has_column(column) {
                        return Err(ExportError::UnknownColumn {
                            column: column.clone(),
                        });
                    }
                }
                subset.clone()
            }
            None => batch.columns().to_vec(),
        };

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        let header: Vec<&str> = columns
            .iter()
            .map(|c| {
                self.renames
                    .iter()
                    .find(|(from, _)| from == c)
                    .map(|(_, to)| to.as_str())
                    .unwrap_or(c.as_str())
            })
            .collect();
        writer.write_record(&header)?;

        for (index, _) in batch.records().iter().enumerate() {
            let row: Vec<&str> = columns.iter().map(|c| batch.value(index, c)).collect();
            writer.write_record(&row)?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write the batch to a file.
    pub fn write_path(
        &self,
        batch: &RecordBatch,
        path: impl AsRef<Path>,
    ) -> Result<(), ExportError> {
        let text = self.write_str(batch)?;
        File::create(path.as_ref())?.write_all(text.as_bytes())?;
        debug!(
            path = %path.as_ref().display(),
            records = batch.len(),
            "wrote csv output"
        );
        Ok(())
    }
}
