// GeoInsert - app/batch.rs
//
// Batch lifecycle. Orchestrates discovery, per-file conversion and INSERT
// filtering, reporting progress through a caller-supplied callback.
//
// Architecture:
//   - Files are processed sequentially, one blocking tool run at a time.
//   - A conversion failure aborts the batch; there is no retry and no
//     recovery across files.
//   - An optional `Arc<AtomicBool>` cancel flag is checked before each file.
//   - The input folder is validated before the output folder is touched.

use crate::core::converter::{output_path_for, plan_job, DumpConverter};
use crate::core::discovery;
use crate::core::filter;
use crate::core::model::{
    percent_for, BatchProgress, BatchSummary, ConversionParams, FileOutcome, SourceFile,
};
use crate::util::constants;
use crate::util::error::{ConvertError, GeoInsertError, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Everything a batch run needs besides the converter.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Folder scanned for `.geojson` files.
    pub input_dir: PathBuf,

    /// Folder receiving the INSERT-only `.sql` files.
    pub output_dir: PathBuf,

    pub params: ConversionParams,

    /// Keep raw dumps in `<output>/_temp_sql` after a successful batch.
    pub keep_temp: bool,

    /// When set to `true`, the batch stops before starting the next file.
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            params: ConversionParams::default(),
            keep_temp: true,
            cancel_flag: None,
        }
    }

    /// Directory receiving raw tool output.
    pub fn temp_dir(&self) -> PathBuf {
        self.output_dir.join(constants::TEMP_DIR_NAME)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Convert every GeoJSON file in `config.input_dir`.
///
/// # Progress reporting
/// `on_progress` receives `Started`, then `FileStarted`/`FileCompleted` for
/// each file in name order, then `Finished`. It is called on the caller's
/// thread and should be cheap.
///
/// # Errors
/// Discovery failures (missing input folder, no GeoJSON files, colliding
/// table names) are returned before any output is created. The first
/// conversion failure aborts the batch; outputs already written are kept.
pub fn run_batch<C, F>(
    config: &BatchConfig,
    converter: &C,
    mut on_progress: F,
) -> Result<BatchSummary>
where
    C: DumpConverter + ?Sized,
    F: FnMut(&BatchProgress),
{
    let started_at = Utc::now();

    let (sources, warnings) = discovery::discover_sources(&config.input_dir)?;
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }

    let temp_dir = config.temp_dir();
    create_dir(&config.output_dir, "create output directory")?;
    create_dir(&temp_dir, "create temp directory")?;

    let total = sources.len();
    tracing::info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        files = total,
        schema = %config.params.schema,
        srid = config.params.srid,
        "Batch starting"
    );
    on_progress(&BatchProgress::Started { total });

    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(total);
    let mut cancelled = false;

    for (index, source) in sources.iter().enumerate() {
        if config.is_cancelled() {
            tracing::info!(completed = index, total, "Batch cancelled by request");
            cancelled = true;
            break;
        }

        on_progress(&BatchProgress::FileStarted {
            index,
            total,
            name: source.file_name.clone(),
            percent: percent_for(index, total),
        });
        tracing::info!(file = %source.file_name, "Processing: {}", source.file_name);

        let outcome = convert_one(source, config, &temp_dir, converter)?;

        on_progress(&BatchProgress::FileCompleted {
            index,
            total,
            outcome: outcome.clone(),
        });
        outcomes.push(outcome);
    }

    let mut kept_temp_dir = Some(temp_dir.clone());
    if !config.keep_temp && !cancelled {
        match std::fs::remove_dir_all(&temp_dir) {
            Ok(()) => kept_temp_dir = None,
            Err(e) => tracing::warn!(
                path = %temp_dir.display(),
                error = %e,
                "Could not remove temp directory"
            ),
        }
    }

    on_progress(&BatchProgress::Finished {
        files: outcomes.len(),
        cancelled,
    });

    let summary = BatchSummary {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        temp_dir: kept_temp_dir,
        params: config.params.clone(),
        started_at,
        finished_at: Utc::now(),
        files: outcomes,
        cancelled,
    };

    if !cancelled {
        tracing::info!(
            files = summary.files.len(),
            inserts = summary.total_inserts(),
            "Conversion completed successfully"
        );
    }

    Ok(summary)
}

/// Run the tool for one source and filter its dump into the output folder.
fn convert_one<C: DumpConverter + ?Sized>(
    source: &SourceFile,
    config: &BatchConfig,
    temp_dir: &Path,
    converter: &C,
) -> std::result::Result<FileOutcome, ConvertError> {
    let started = Instant::now();
    let job = plan_job(source, temp_dir, &config.params);
    let output = output_path_for(source, &config.output_dir);

    // A dump left over from an earlier run would hide a tool that silently
    // wrote nothing.
    match std::fs::remove_file(&job.dump_path) {
        Ok(()) => tracing::debug!(path = %job.dump_path.display(), "Removed stale dump"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ConvertError::Io {
                path: job.dump_path.clone(),
                source: e,
            })
        }
    }

    converter.convert(&job)?;
    let stats = filter::filter_file(&job.dump_path, &output)?;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(
        table = %job.qualified_table,
        output = %output.display(),
        kept = stats.kept,
        dropped = stats.dropped,
        elapsed_ms,
        "File converted"
    );

    Ok(FileOutcome {
        source: source.path.clone(),
        table: source.table.clone(),
        output,
        stats,
        elapsed_ms,
    })
}

fn create_dir(path: &Path, operation: &'static str) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| GeoInsertError::Io {
        path: path.to_path_buf(),
        operation,
        source: e,
    })
}
