use crate::model::ResultTable;
use crate::sink::{ResultSink, SinkError};
use crate::utils::file_stem;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `<dir>/<file-stem>.csv` (see [`file_stem`]), replacing the previous tick's file.
pub struct CsvExportSink {
    dir: PathBuf,
}

impl CsvExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, series_name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(series_name)))
    }

    fn write_table(path: &Path, table: &ResultTable) -> Result<(), SinkError> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec!["date".to_string()];
        header.extend(table.names().into_iter().map(String::from));
        writer.write_record(&header)?;

        for (row, date) in table.index().iter().enumerate() {
            let mut record = vec![date.to_rfc3339()];
            for column in table.columns() {
                let v = column.values[row];
                record.push(if v.is_nan() { String::new() } else { v.to_string() });
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ResultSink for CsvExportSink {
    fn publish(&self, table: &ResultTable) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(table.series_name());
        Self::write_table(&path, table)?;
        info!("Saved results: {}", path.display());
        Ok(())
    }
}
