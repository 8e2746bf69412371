use futures::future::join_all;
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};
use trend_watch::config::{AppConfig, config_path, load_config};
use trend_watch::fetcher::{GoogleTrendsClient, TrendsSource};
use trend_watch::monitor::TrendsMonitor;
use trend_watch::sink::{ConsoleSink, CsvExportSink, FanoutSink, ResultSink};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let path = config_path();
    let config: AppConfig = match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", path, e);
            return;
        }
    };

    let http = match GoogleTrendsClient::build_http_client(config.request_timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    let sink = build_sink(&config);
    let settings = config.monitor_settings();

    info!("Keywords to monitor: {}", config.keywords.len());
    let mut monitors: Vec<TrendsMonitor> = config
        .keywords
        .iter()
        .map(|keyword| {
            let source: Arc<dyn TrendsSource> = Arc::new(GoogleTrendsClient::new(
                http.clone(),
                config.request_for(keyword),
                config.drop_partial,
            ));
            TrendsMonitor::new(source, sink.clone(), settings)
        })
        .collect();

    for monitor in monitors.iter_mut() {
        if let Err(e) = monitor.start() {
            warn!("Could not start monitor for '{}': {}", monitor.name(), e);
        }
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested.");
                break;
            }
            _ = sleep(Duration::from_secs(1)) => {
                if monitors.iter().all(|m| !m.is_active()) {
                    warn!("All monitors have stopped.");
                    break;
                }
            }
        }
    }

    let outcomes = join_all(monitors.iter_mut().map(|m| async move {
        let result = m.stop(true).await;
        (m.name().to_string(), result)
    }))
    .await;

    for (name, result) in outcomes {
        match result {
            Ok(()) => info!("Monitor for '{}' finished cleanly", name),
            Err(e) => error!("Monitor for '{}' ended with error: {}", name, e),
        }
    }
}

/// Console output always, plus CSV export when `export_dir` is set.
fn build_sink(config: &AppConfig) -> Arc<dyn ResultSink> {
    let mut sinks: Vec<Arc<dyn ResultSink>> = vec![Arc::new(ConsoleSink::new(config.output_format))];
    if let Some(dir) = &config.export_dir {
        info!("Exporting results to {}", dir.display());
        sinks.push(Arc::new(CsvExportSink::new(dir.clone())));
    }
    Arc::new(FanoutSink::new(sinks))
}
