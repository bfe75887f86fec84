use flow_tracker::analyzer::flags::latest_features;
use flow_tracker::analyzer::valid_readings;
use flow_tracker::config::{AppConfig, load_config};
use flow_tracker::model::Reading;
use flow_tracker::parser::{ImportParser, Parser};
use flow_tracker::report::{build_report, save_report};
use flow_tracker::risk::{Classifier, HttpClassifier, probabilities_or_empty};
use flow_tracker::source::{FeedFetcher, ReadingSource};
use flow_tracker::storage::{ReadingStore, SqliteStorage, append_unseen};
use futures::future::join_all;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {:?}", e);
            return;
        }
    };

    if let Some(path) = &config.import_path {
        import_readings(path, &storage).await;
    }

    let source = match &config.sensor {
        Some(sensor) => match FeedFetcher::new(
            sensor.feed_url.clone(),
            sensor.results,
            sensor.field_map.clone(),
            Duration::from_secs(sensor.timeout_seconds),
        ) {
            Ok(fetcher) => Some((sensor.user_id.clone(), fetcher)),
            Err(e) => {
                error!("Failed to build feed client: {}", e);
                return;
            }
        },
        None => None,
    };

    let classifier: Option<Box<dyn Classifier>> = match &config.classifier {
        Some(cfg) => match HttpClassifier::new(
            cfg.endpoint.clone(),
            Duration::from_secs(cfg.timeout_seconds),
        ) {
            Ok(c) => Some(Box::new(c) as Box<dyn Classifier>),
            Err(e) => {
                warn!("Classifier disabled: {}", e);
                None
            }
        },
        None => None,
    };

    info!("🚀 flow-tracker started");

    loop {
        info!("Entering main loop...");

        if let Some((user_id, fetcher)) = &source {
            poll_sensor(user_id, fetcher, &storage).await;
        }

        let users = collect_users(&config, &storage).await;
        info!("Users to process: {}", users.len());

        let tasks: Vec<_> = users
            .iter()
            .map(|user_id| {
                process_user(user_id, storage.clone(), classifier.as_deref(), &config.report_dir)
            })
            .collect();
        join_all(tasks).await;

        info!("Waiting for timer ({}s) or Ctrl-C...", config.check_interval_seconds);
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down.");
                break;
            }
        }
    }
}

/// Loads a JSON array of readings once, skipping malformed entries.
async fn import_readings(path: &str, storage: &Arc<Mutex<SqliteStorage>>) {
    let body = match fs::read_to_string(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("Cannot read import file {}: {}", path, e);
            return;
        }
    };
    let raws = match ImportParser.parse(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Import parse error: {}", e);
            return;
        }
    };

    let readings = valid_readings(&raws);
    // Re-running the same import must not double the stored flow.
    let saved = match append_unseen(&*storage.lock().await, &readings) {
        Ok(n) => n,
        Err(e) => {
            warn!("DB read error: {:?}", e);
            return;
        }
    };
    info!("Imported {} of {} readings from {}", saved, raws.len(), path);
}

/// Fetches the sensor feed and stores entries newer than the last stored reading.
async fn poll_sensor(user_id: &str, fetcher: &FeedFetcher, storage: &Arc<Mutex<SqliteStorage>>) {
    let raws = match fetcher.fetch(user_id).await {
        Ok(r) => r,
        Err(e) => {
            warn!("Feed fetch error: {}", e);
            return;
        }
    };

    let guard = storage.lock().await;
    let stored = match guard.list_readings(user_id) {
        Ok(r) => r,
        Err(e) => {
            warn!("DB read error: {:?}", e);
            return;
        }
    };
    let fresh = newer_than_stored(valid_readings(&raws), &stored);

    for reading in &fresh {
        if let Err(e) = guard.append_reading(reading) {
            warn!("DB save error: {:?}", e);
        }
    }
    info!("Stored {} new readings for {}", fresh.len(), user_id);
}

// The feed returns the last N entries on every poll; keep only unseen ones.
fn newer_than_stored(fetched: Vec<Reading>, stored: &[Reading]) -> Vec<Reading> {
    match stored.iter().map(|r| r.timestamp).max() {
        Some(last) => fetched.into_iter().filter(|r| r.timestamp > last).collect(),
        None => fetched,
    }
}

async fn collect_users(config: &AppConfig, storage: &Arc<Mutex<SqliteStorage>>) -> Vec<String> {
    let mut users = config.tracked_users();
    match storage.lock().await.list_users() {
        Ok(stored) => users.extend(stored),
        Err(e) => warn!("Cannot list stored users: {:?}", e),
    }
    users.sort();
    users.dedup();
    users
}

/// Rebuilds cycles, scores the latest biomarkers and writes the user's report.
async fn process_user(
    user_id: &str,
    storage: Arc<Mutex<SqliteStorage>>,
    classifier: Option<&dyn Classifier>,
    report_dir: &str,
) {
    info!("Processing user: {}", user_id);

    let readings = match storage.lock().await.list_readings(user_id) {
        Ok(r) => r,
        Err(e) => {
            warn!("DB read error for {}: {:?}", user_id, e);
            return;
        }
    };

    let probabilities = match classifier {
        Some(c) => probabilities_or_empty(c, &latest_features(&readings)).await,
        None => HashMap::new(),
    };

    let report = {
        let guard = storage.lock().await;
        build_report(&*guard, user_id, &readings, &probabilities)
    };
    let report = match report {
        Ok(r) => r,
        Err(e) => {
            warn!("Report failed for {}: {}", user_id, e);
            return;
        }
    };

    info!(
        "{}: {} cycles, overall risk {}",
        user_id,
        report.cycles.len(),
        report.risk.overall_risk_level
    );
    if let Err(e) = save_report(Path::new(report_dir), &report) {
        warn!("Failed to save report for {}: {}", user_id, e);
    }

    info!("Finished processing user: {}", user_id);
}
