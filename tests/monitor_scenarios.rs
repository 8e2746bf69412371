//! Integration tests for TrendsMonitor: tick cadence, empty fetches, fatal errors
//! and cooperative stop, driven by scripted sources and a collecting sink.

#[cfg(test)]
mod monitor_scenarios {
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};
    use trend_watch::analyzer::AnalysisParams;
    use trend_watch::fetcher::TrendsSource;
    use trend_watch::model::{FetchError, ResultTable, Series, SeriesPoint};
    use trend_watch::monitor::{MonitorError, MonitorSettings, MonitorState, TrendsMonitor};
    use trend_watch::sink::{ResultSink, SinkError};

    fn zigzag() -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        let values = [1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0];
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                timestamp: start + ChronoDuration::weeks(i as i64),
                value,
            })
            .collect();
        Series::new("rust", points).unwrap()
    }

    /// Replays a script of fetch results; once exhausted, repeats `fallback`.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Series, FetchError>>>,
        fallback: fn() -> Result<Series, FetchError>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Series, FetchError>>, fallback: fn() -> Result<Series, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl TrendsSource for ScriptedSource {
        fn name(&self) -> &str {
            "rust"
        }

        async fn fetch(&self) -> Result<Series, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(self.fallback)
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        tables: Mutex<Vec<ResultTable>>,
    }

    impl CollectingSink {
        fn count(&self) -> usize {
            self.tables.lock().unwrap().len()
        }
    }

    impl ResultSink for CollectingSink {
        fn publish(&self, table: &ResultTable) -> Result<(), SinkError> {
            self.tables.lock().unwrap().push(table.clone());
            Ok(())
        }
    }

    fn single_point() -> Series {
        let point = SeriesPoint {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap(),
            value: 42.0,
        };
        Series::new("rust", vec![point]).unwrap()
    }

    struct PanickingSource;

    #[async_trait::async_trait]
    impl TrendsSource for PanickingSource {
        fn name(&self) -> &str {
            "rust"
        }

        async fn fetch(&self) -> Result<Series, FetchError> {
            panic!("upstream client bug");
        }
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn publish(&self, _table: &ResultTable) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::other("read-only")))
        }
    }

    fn settings(interval_ms: u64) -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_millis(interval_ms),
            analysis: AnalysisParams::default(),
        }
    }

    async fn wait_until(cond: impl Fn() -> bool) {
        timeout(Duration::from_secs(5), async {
            while !cond() {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn fetch_error_on_second_call_stops_after_one_publish() {
        let source = ScriptedSource::new(vec![Ok(zigzag())], || Err(FetchError::RateLimited));
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(source.clone(), sink.clone(), settings(0));

        monitor.start().unwrap();
        let outcome = monitor.join().await;

        assert!(matches!(outcome, Err(MonitorError::Source(FetchError::RateLimited))));
        assert_eq!(sink.count(), 1);
        assert_eq!(source.calls(), 2);
        assert_eq!(monitor.state(), MonitorState::Stopped);
        assert!(!monitor.is_active());

        sleep(Duration::from_millis(20)).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn published_table_has_all_descriptors() {
        let source = ScriptedSource::new(vec![Ok(zigzag())], || Err(FetchError::Status(503)));
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(source, sink.clone(), settings(0));

        monitor.start().unwrap();
        let _ = monitor.join().await;

        let tables = sink.tables.lock().unwrap();
        let table = &tables[0];
        assert_eq!(table.series_name(), "rust");
        assert_eq!(table.len(), 10);
        assert_eq!(
            table.names(),
            vec!["Moving Average", "Differential", "Autocorrelation", "Maximum", "Minimum"]
        );
        assert_eq!(table.get("Maximum").unwrap().values[3], 4.0);
        assert_eq!(table.get("Minimum").unwrap().values[6], 1.0);
    }

    #[tokio::test]
    async fn empty_series_skips_analysis_and_keeps_running() {
        let source = ScriptedSource::new(Vec::new(), || Ok(Series::empty("rust")));
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(source.clone(), sink.clone(), settings(1));

        monitor.start().unwrap();
        wait_until(|| source.calls() >= 3).await;
        assert_eq!(monitor.state(), MonitorState::Running);

        monitor.stop(true).await.unwrap();
        assert_eq!(sink.count(), 0);
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test]
    async fn no_ticks_after_blocking_stop() {
        let source = ScriptedSource::new(Vec::new(), || Ok(zigzag()));
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(source.clone(), sink.clone(), settings(1));

        monitor.start().unwrap();
        wait_until(|| sink.count() >= 2).await;
        monitor.stop(true).await.unwrap();

        let calls = source.calls();
        let published = sink.count();
        assert_eq!(calls, published);
        sleep(Duration::from_millis(20)).await;
        assert_eq!(source.calls(), calls);
        assert_eq!(sink.count(), published);
    }

    #[tokio::test]
    async fn analysis_error_is_fatal() {
        let source = ScriptedSource::new(Vec::new(), || Ok(zigzag()));
        let sink = Arc::new(CollectingSink::default());
        let bad = MonitorSettings {
            interval: Duration::ZERO,
            analysis: AnalysisParams { window: 0, lag: 1 },
        };
        let mut monitor = TrendsMonitor::new(source.clone(), sink.clone(), bad);

        monitor.start().unwrap();
        let outcome = monitor.join().await;

        assert!(matches!(outcome, Err(MonitorError::Analysis(_))));
        assert_eq!(sink.count(), 0);
        assert_eq!(source.calls(), 1);
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test]
    async fn sink_failure_is_not_fatal() {
        let source = ScriptedSource::new(vec![Ok(zigzag()), Ok(zigzag())], || {
            Err(FetchError::Http("connection reset".into()))
        });
        let mut monitor = TrendsMonitor::new(source.clone(), Arc::new(FailingSink), settings(0));

        monitor.start().unwrap();
        let outcome = monitor.join().await;

        assert!(matches!(outcome, Err(MonitorError::Source(FetchError::Http(_)))));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn lifecycle_is_idle_then_terminal() {
        let source = ScriptedSource::new(Vec::new(), || Ok(Series::empty("rust")));
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(source.clone(), sink, settings(1));
        assert_eq!(monitor.state(), MonitorState::Idle);

        monitor.start().unwrap();
        assert!(matches!(monitor.start(), Err(MonitorError::AlreadyStarted)));

        monitor.stop(true).await.unwrap();
        assert_eq!(monitor.state(), MonitorState::Stopped);
        assert!(matches!(monitor.start(), Err(MonitorError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn stopping_an_idle_monitor_is_terminal() {
        let source = ScriptedSource::new(Vec::new(), || Ok(zigzag()));
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(source.clone(), sink, settings(1));

        monitor.stop(false).await.unwrap();
        assert_eq!(monitor.state(), MonitorState::Stopped);
        assert!(monitor.start().is_err());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn single_point_fetch_still_publishes() {
        let source = ScriptedSource::new(vec![Ok(single_point())], || Err(FetchError::RateLimited));
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(source.clone(), sink.clone(), settings(0));

        monitor.start().unwrap();
        let outcome = monitor.join().await;

        assert!(matches!(outcome, Err(MonitorError::Source(FetchError::RateLimited))));
        assert_eq!(source.calls(), 2);
        let tables = sink.tables.lock().unwrap();
        assert_eq!(tables.len(), 1);
        assert!(tables[0].get("Autocorrelation").unwrap().values[0].is_nan());
    }

    #[tokio::test]
    async fn dropping_a_running_monitor_ends_its_loop() {
        let source = ScriptedSource::new(Vec::new(), || Ok(Series::empty("rust")));
        {
            let sink = Arc::new(CollectingSink::default());
            let mut monitor = TrendsMonitor::new(source.clone(), sink, settings(1));
            monitor.start().unwrap();
            wait_until(|| source.calls() >= 2).await;
        }

        // an in-flight tick may still finish
        sleep(Duration::from_millis(20)).await;
        let settled = source.calls();
        sleep(Duration::from_millis(30)).await;
        assert_eq!(source.calls(), settled);
    }

    #[tokio::test]
    async fn panicking_task_reports_stopped() {
        let sink = Arc::new(CollectingSink::default());
        let mut monitor = TrendsMonitor::new(Arc::new(PanickingSource), sink, settings(1));

        monitor.start().unwrap();
        wait_until(|| monitor.state() == MonitorState::Stopped).await;
        assert!(!monitor.is_active());

        let outcome = monitor.join().await;
        assert!(matches!(outcome, Err(MonitorError::Task(_))));
    }
}
