// Result sinks: where a finished ResultTable goes after each tick.

pub mod console;
pub mod csv_export;

use crate::model::ResultTable;
use std::sync::Arc;
use thiserror::Error;

pub use console::{ConsoleSink, OutputFormat};
pub use csv_export::CsvExportSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives every table a monitor publishes.
pub trait ResultSink: Send + Sync {
    fn publish(&self, table: &ResultTable) -> Result<(), SinkError>;
}

/// Publishes to several sinks in order. Every sink is attempted; the first error is returned.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn ResultSink>>) -> Self {
        Self { sinks }
    }
}

impl ResultSink for FanoutSink {
    fn publish(&self, table: &ResultTable) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.publish(table) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Counting(Mutex<usize>);

    impl ResultSink for Counting {
        fn publish(&self, _table: &ResultTable) -> Result<(), SinkError> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct Failing;

    impl ResultSink for Failing {
        fn publish(&self, _table: &ResultTable) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn fanout_reaches_every_sink_despite_failure() {
        let counting = Arc::new(Counting(Mutex::new(0)));
        let fanout = FanoutSink::new(vec![Arc::new(Failing), counting.clone()]);
        let table = ResultTable::from_parts("rust", Vec::new(), Vec::new()).unwrap();

        assert!(fanout.publish(&table).is_err());
        assert_eq!(*counting.0.lock().unwrap(), 1);
    }
}
