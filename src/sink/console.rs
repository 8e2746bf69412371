use crate::model::ResultTable;
use crate::sink::{ResultSink, SinkError};
use crate::utils::format_value;
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Prints each published table to stdout.
pub struct ConsoleSink {
    format: OutputFormat,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, table: &ResultTable) -> Result<String, SinkError> {
        match self.format {
            OutputFormat::Table => Ok(render_table(table)),
            OutputFormat::Json => Ok(serde_json::to_string(table)?),
        }
    }
}

impl ResultSink for ConsoleSink {
    fn publish(&self, table: &ResultTable) -> Result<(), SinkError> {
        let rendered = self.render(table)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered)?;
        Ok(())
    }
}

fn render_table(table: &ResultTable) -> String {
    let names = table.names();
    let widths: Vec<usize> = names.iter().map(|n| n.len().max(10)).collect();

    let mut out = format!("=== {} ({} rows)\n", table.series_name(), table.len());
    out.push_str(&format!("{:<10}", "date"));
    for (name, width) in names.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", name, width = width));
    }
    out.push('\n');

    for (row, date) in table.index().iter().enumerate() {
        out.push_str(&date.format("%Y-%m-%d").to_string());
        for (column, width) in table.columns().iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", format_value(column.values[row]), width = width));
        }
        out.push('\n');
    }
    out
}
