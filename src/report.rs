use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::IterateError;
use crate::types::RunReport;

/// Filesystem-safe identifier for one run, e.g. `1-2024-05-01T10_20_30_123456`.
pub fn log_id(stage: usize, now: DateTime<Utc>) -> String {
    let iso = now
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
        .replace([':', '.'], "_");
    format!("{}-{}", stage, iso)
}

/// `<log_root>/<stage>/<log_id>.json`
pub fn report_path(log_root: &Path, stage: usize, log_id: &str) -> PathBuf {
    log_root
        .join(stage.to_string())
        .join(format!("{}.json", log_id))
}

/// Persist `report` under `log_root`, creating the stage directory if needed.
///
/// Returns the path written.
pub fn write_report(
    log_root: &Path,
    stage: usize,
    report: &RunReport,
    now: DateTime<Utc>,
) -> Result<PathBuf, IterateError> {
    let path = report_path(log_root, stage, &log_id(stage, now));

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| IterateError::ReportWrite {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string(report).map_err(|e| IterateError::ReportWrite {
        path: path.clone(),
        source: e.into(),
    })?;
    std::fs::write(&path, json).map_err(|source| IterateError::ReportWrite {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), entries = report.len(), "wrote run report");
    Ok(path)
}

/// Load a report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<RunReport, IterateError> {
    let content = std::fs::read_to_string(path).map_err(|e| IterateError::ReportRead {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| IterateError::ReportRead {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
