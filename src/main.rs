// GeoInsert - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and merging with CLI overrides
// 3. Logging initialisation (debug mode support)
// 4. Running the batch and printing per-file progress

use clap::Parser;
use geoinsert::app::batch::{self, BatchConfig};
use geoinsert::core::model::{percent_for, BatchProgress, BatchSummary};
use geoinsert::core::report;
use geoinsert::platform::config::{self, AppConfig, PlatformPaths};
use geoinsert::platform::ogr::Ogr2Ogr;
use geoinsert::util;
use geoinsert::util::error::GeoInsertError;
use std::path::PathBuf;

/// GeoInsert - GeoJSON to INSERT-only PostGIS SQL.
///
/// Runs ogr2ogr (GDAL) on every .geojson file in INPUT_DIR and writes one
/// SQL file per input to OUTPUT_DIR, keeping only the INSERT INTO statements.
#[derive(Parser, Debug)]
#[command(name = "geoinsert", version, about)]
struct Cli {
    /// Folder containing the .geojson files to convert.
    input_dir: PathBuf,

    /// Folder receiving one INSERT-only .sql file per input.
    output_dir: PathBuf,

    /// Target schema for the generated tables [default: gis].
    #[arg(short = 's', long = "schema")]
    schema: Option<String>,

    /// Spatial reference id of the geometry column [default: 4326].
    #[arg(long = "srid")]
    srid: Option<i32>,

    /// Geometry column name [default: the_geom].
    #[arg(short = 'g', long = "geom-col")]
    geom_col: Option<String>,

    /// Client encoding passed to ogr2ogr as PGCLIENTENCODING [default: UTF-8].
    #[arg(short = 'e', long = "encoding")]
    encoding: Option<String>,

    /// Path to the ogr2ogr binary [default: ogr2ogr on PATH].
    #[arg(long = "ogr2ogr", value_name = "PATH")]
    ogr2ogr: Option<PathBuf>,

    /// Delete the raw dumps in OUTPUT_DIR/_temp_sql after a successful run.
    #[arg(long = "clean-temp")]
    clean_temp: bool,

    /// Write a JSON summary of the batch to this file.
    #[arg(short = 'r', long = "report", value_name = "PATH")]
    report: Option<PathBuf>,

    /// Read settings from this config.toml instead of the platform default.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Suppress per-file progress output on stdout.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging exists so that [logging] can take effect;
    // its warnings are replayed once the subscriber is installed.
    let (app_config, config_warnings) = match load_app_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "GeoInsert starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    match run(&cli, app_config) {
        Ok(summary) => {
            if !cli.quiet {
                println!("{}", summary_line(&summary));
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Batch failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn load_app_config(cli: &Cli) -> Result<(AppConfig, Vec<String>), GeoInsertError> {
    let (path, required) = match cli.config {
        Some(ref explicit) => (explicit.clone(), true),
        None => (PlatformPaths::resolve().config_file(), false),
    };
    Ok(config::load_config(&path, required)?)
}

/// Merge CLI overrides into the config and run the batch.
fn run(cli: &Cli, app_config: AppConfig) -> Result<BatchSummary, GeoInsertError> {
    let mut params = app_config.params;
    if let Some(ref schema) = cli.schema {
        params.schema = schema.clone();
    }
    if let Some(srid) = cli.srid {
        params.srid = srid;
    }
    if let Some(ref column) = cli.geom_col {
        params.geometry_column = column.clone();
    }
    if let Some(ref encoding) = cli.encoding {
        params.client_encoding = encoding.clone();
    }
    config::validate_params(&params)?;

    let converter = converter_for(cli, app_config.ogr2ogr_program);
    tracing::debug!(program = %converter.program().display(), "Using ogr2ogr");

    let batch_config = BatchConfig {
        params,
        keep_temp: app_config.keep_temp && !cli.clean_temp,
        ..BatchConfig::new(&cli.input_dir, &cli.output_dir)
    };

    let quiet = cli.quiet;
    let summary = batch::run_batch(&batch_config, &converter, |progress| {
        if quiet {
            return;
        }
        if let BatchProgress::FileCompleted {
            index,
            total,
            outcome,
        } = progress
        {
            println!(
                "[{:>3}%] {} -> {} ({} INSERT)",
                percent_for(index + 1, *total),
                outcome.source.display(),
                outcome.output.display(),
                outcome.stats.kept
            );
        }
    })?;

    if let Some(ref report_path) = cli.report {
        report::save_report(&summary, report_path)?;
    }

    Ok(summary)
}

/// `--ogr2ogr` wins over the configured program.
fn converter_for(cli: &Cli, configured: PathBuf) -> Ogr2Ogr {
    Ogr2Ogr::new(cli.ogr2ogr.clone().unwrap_or(configured))
}

fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "Done: {} file(s), {} INSERT statement(s) written to {} ({} other line(s) dropped)",
        summary.files.len(),
        summary.total_inserts(),
        summary.output_dir.display(),
        summary.total_dropped()
    )
}
