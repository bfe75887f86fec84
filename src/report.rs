// Per-user report assembly and persistence
use crate::analyzer::flags::{health_flags, latest_features};
use crate::analyzer::{CycleAnalyzer, CycleAnalyzerImpl, collapse_to_daily, rebuild_cycles};
use crate::model::{Reading, ReportError, UserReport};
use crate::risk::assess;
use crate::storage::CycleRepository;
use crate::utils::to_file_stem;
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Rebuilds the user's cycles in `repo`, then summarizes and scores them.
/// `probabilities` is the classifier output for `latest_features(readings)`.
pub fn build_report<R: CycleRepository + ?Sized>(
    repo: &R,
    user_id: &str,
    readings: &[Reading],
    probabilities: &HashMap<String, f64>,
) -> Result<UserReport, ReportError> {
    let spans = rebuild_cycles(repo, user_id, readings)?;
    let daily = collapse_to_daily(readings);
    let analyzer = CycleAnalyzerImpl::new();

    let cycles = spans.iter().map(|span| analyzer.summarize(span, &daily)).collect();
    let overall = analyzer.overall(user_id, &spans, &daily);
    let flags = health_flags(user_id, readings, &spans);
    let risk = assess(&latest_features(readings), probabilities);

    Ok(UserReport {
        user_id: user_id.to_string(),
        generated_at: Utc::now(),
        readings: readings.len(),
        cycles,
        overall,
        health_flags: flags,
        risk,
    })
}

/// Writes `report-<user>.json` into `dir`, replacing the previous one.
pub fn save_report(dir: &Path, report: &UserReport) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("report-{}.json", to_file_stem(&report.user_id)));
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    info!("Saved report: {}", path.display());
    Ok(path)
}
