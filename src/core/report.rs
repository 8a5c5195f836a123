// GeoInsert - core/report.rs
//
// JSON export of a batch summary.
// Core layer: writes to any Write trait object.

use crate::core::model::BatchSummary;
use crate::util::error::ReportError;
use std::io::Write;
use std::path::Path;

/// Write `summary` as pretty-printed JSON.
///
/// `report_path` is only used for error context.
pub fn write_report_json<W: Write>(
    summary: &BatchSummary,
    mut writer: W,
    report_path: &Path,
) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut writer, summary).map_err(|e| ReportError::Json {
        path: report_path.to_path_buf(),
        source: e,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| ReportError::Io {
            path: report_path.to_path_buf(),
            source: e,
        })
}

/// Create (or truncate) `report_path` and write the summary into it.
pub fn save_report(summary: &BatchSummary, report_path: &Path) -> Result<(), ReportError> {
    let file = std::fs::File::create(report_path).map_err(|e| ReportError::Io {
        path: report_path.to_path_buf(),
        source: e,
    })?;
    write_report_json(summary, std::io::BufWriter::new(file), report_path)?;
    tracing::info!(path = %report_path.display(), "Batch report written");
    Ok(())
}
