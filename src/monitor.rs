use crate::analyzer::{AnalysisParams, TrendAnalyzer};
use crate::fetcher::TrendsSource;
use crate::model::{AnalysisError, FetchError};
use crate::sink::ResultSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("source unavailable: {0}")]
    Source(#[from] FetchError),

    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("monitor was already started")]
    AlreadyStarted,

    #[error("monitor task ended abnormally: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub analysis: AnalysisParams,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            analysis: AnalysisParams::default(),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published { rows: usize },
    Empty,
}

/// Periodically fetches a series, analyzes it and publishes the result table.
///
/// Runs on one dedicated tokio task. Stopping is cooperative: the active flag is
/// checked at the top of each tick, so an in-flight fetch or sleep always finishes.
/// A fetch or analysis error clears the flag and ends the run.
pub struct TrendsMonitor {
    source: Arc<dyn TrendsSource>,
    sink: Arc<dyn ResultSink>,
    settings: MonitorSettings,
    active: Arc<AtomicBool>,
    started: bool,
    handle: Option<JoinHandle<Result<(), MonitorError>>>,
}

impl TrendsMonitor {
    pub fn new(source: Arc<dyn TrendsSource>, sink: Arc<dyn ResultSink>, settings: MonitorSettings) -> Self {
        Self {
            source,
            sink,
            settings,
            active: Arc::new(AtomicBool::new(false)),
            started: false,
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn state(&self) -> MonitorState {
        // a panicked task exits without clearing the flag
        let finished = self.handle.as_ref().is_some_and(|h| h.is_finished());
        if !self.started {
            MonitorState::Idle
        } else if self.active.load(Ordering::SeqCst) && !finished {
            MonitorState::Running
        } else {
            MonitorState::Stopped
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == MonitorState::Running
    }

    /// Spawns the background loop. A monitor runs at most once.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.started {
            return Err(MonitorError::AlreadyStarted);
        }
        self.started = true;
        self.active.store(true, Ordering::SeqCst);

        let source = self.source.clone();
        let sink = self.sink.clone();
        let settings = self.settings;
        let active = self.active.clone();
        self.handle = Some(tokio::spawn(run_loop(source, sink, settings, active)));
        Ok(())
    }

    /// Clears the active flag. With `wait`, also joins the background task and returns
    /// its outcome, so no tick runs after this returns.
    pub async fn stop(&mut self, wait: bool) -> Result<(), MonitorError> {
        self.started = true;
        self.active.store(false, Ordering::SeqCst);
        info!("Stopping trends monitoring for '{}'", self.source.name());
        if wait { self.join().await } else { Ok(()) }
    }

    /// Waits for the background task to exit without requesting a stop.
    pub async fn join(&mut self) -> Result<(), MonitorError> {
        match self.handle.take() {
            Some(handle) => handle.await.map_err(|e| MonitorError::Task(e.to_string()))?,
            None => Ok(()),
        }
    }
}

impl Drop for TrendsMonitor {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

async fn run_loop(
    source: Arc<dyn TrendsSource>,
    sink: Arc<dyn ResultSink>,
    settings: MonitorSettings,
    active: Arc<AtomicBool>,
) -> Result<(), MonitorError> {
    info!("Trends monitoring started for '{}'", source.name());

    while active.load(Ordering::SeqCst) {
        match tick(source.as_ref(), sink.as_ref(), settings.analysis).await {
            Ok(TickOutcome::Published { rows }) => {
                info!("Published {} rows for '{}'", rows, source.name());
            }
            Ok(TickOutcome::Empty) => {
                info!("No data for '{}', skipping analysis", source.name());
            }
            Err(e) => {
                active.store(false, Ordering::SeqCst);
                error!("Trends monitoring for '{}' failed: {}", source.name(), e);
                return Err(e);
            }
        }
        sleep(settings.interval).await;
    }

    info!("Trends monitoring stopped for '{}'", source.name());
    Ok(())
}

/// One fetch-analyze-publish cycle. A sink failure is logged, not fatal.
pub async fn tick(
    source: &dyn TrendsSource,
    sink: &dyn ResultSink,
    params: AnalysisParams,
) -> Result<TickOutcome, MonitorError> {
    let series = source.fetch().await?;
    if series.is_empty() {
        return Ok(TickOutcome::Empty);
    }

    let table = TrendAnalyzer::with_params(series, params).collect_results()?;
    if let Err(e) = sink.publish(&table) {
        warn!("Failed to publish results for '{}': {}", table.series_name(), e);
    }
    Ok(TickOutcome::Published { rows: table.len() })
}
