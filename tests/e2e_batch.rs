// GeoInsert - tests/e2e_batch.rs
//
// End-to-end tests for the batch pipeline.
//
// These tests exercise the real filesystem, real discovery, real INSERT
// filtering and real report writing. The external tool is replaced by a
// converter that copies a captured PGDump file into place, except for the
// tests that check how a missing ogr2ogr binary is reported.

use geoinsert::app::batch::{run_batch, BatchConfig};
use geoinsert::core::converter::DumpConverter;
use geoinsert::core::model::{BatchProgress, ConversionJob};
use geoinsert::core::report;
use geoinsert::platform::ogr::Ogr2Ogr;
use geoinsert::util::error::{ConvertError, DiscoveryError, GeoInsertError};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Stands in for ogr2ogr by copying a captured PGDump file to the dump path.
///
/// Fails with a tool error on the call numbered `fail_on` (0-based), if set.
struct FixtureConverter {
    calls: Cell<usize>,
    fail_on: Option<usize>,
}

impl FixtureConverter {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
            fail_on: None,
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            calls: Cell::new(0),
            fail_on: Some(call),
        }
    }
}

impl DumpConverter for FixtureConverter {
    fn convert(&self, job: &ConversionJob) -> Result<(), ConvertError> {
        let call = self.calls.get();
        self.calls.set(call + 1);

        if self.fail_on == Some(call) {
            return Err(ConvertError::ToolFailed {
                program: PathBuf::from("ogr2ogr"),
                source_file: job.source.clone(),
                exit_code: Some(1),
                stderr: "ERROR 1: simulated failure".to_string(),
            });
        }

        fs::copy(fixture("roads_pgdump.sql"), &job.dump_path).map_err(|e| ConvertError::Io {
            path: job.dump_path.clone(),
            source: e,
        })?;
        Ok(())
    }
}

/// Input folder with two GeoJSON files (different extension case) and noise.
fn make_input() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::copy(fixture("Roads.geojson"), dir.path().join("Roads.geojson")).expect("copy roads");
    fs::copy(fixture("Roads.geojson"), dir.path().join("Parcels.GEOJSON")).expect("copy parcels");
    fs::write(dir.path().join("notes.txt"), "not a layer").expect("write notes");
    dir
}

fn sql_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read output dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Happy path
// =============================================================================

/// One output file per input, named from the lowercased stem.
#[test]
fn e2e_one_sql_file_per_geojson() {
    let input = make_input();
    let output = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(input.path(), output.path().join("sql"));

    let converter = FixtureConverter::new();
    let summary = run_batch(&config, &converter, |_| {}).unwrap();

    assert_eq!(converter.calls.get(), 2);
    assert_eq!(summary.files.len(), 2);
    assert_eq!(
        sql_files(&output.path().join("sql")),
        vec!["parcels.sql".to_string(), "roads.sql".to_string()]
    );
}

/// Every line of every output file is an insert statement.
#[test]
fn e2e_outputs_contain_only_inserts() {
    let input = make_input();
    let output = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(input.path(), output.path());

    let summary = run_batch(&config, &FixtureConverter::new(), |_| {}).unwrap();

    for outcome in &summary.files {
        let content = fs::read_to_string(&outcome.output).expect("read output");
        assert_eq!(content.lines().count(), 3, "in {}", outcome.output.display());
        for line in content.lines() {
            assert!(
                line.trim_start().to_uppercase().starts_with("INSERT INTO"),
                "non-insert line in {}: {line}",
                outcome.output.display()
            );
        }
        assert!(content.contains("Königsallee"), "UTF-8 text must survive");
        assert_eq!(outcome.stats.kept, 3);
        assert_eq!(outcome.stats.dropped, 8);
    }
    assert_eq!(summary.total_inserts(), 6);
}

/// Raw dumps stay in _temp_sql by default.
#[test]
fn e2e_raw_dumps_kept_in_temp_dir() {
    let input = make_input();
    let output = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(input.path(), output.path());

    let summary = run_batch(&config, &FixtureConverter::new(), |_| {}).unwrap();

    let temp = output.path().join("_temp_sql");
    assert_eq!(summary.temp_dir.as_deref(), Some(temp.as_path()));
    let raw = fs::read_to_string(temp.join("roads.sql")).unwrap();
    assert!(raw.contains("CREATE TABLE"), "raw dump should be untouched");
}

/// Progress reaches every file and finishes uncancelled.
#[test]
fn e2e_progress_reports_each_file() {
    let input = make_input();
    let output = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(input.path(), output.path());

    let mut started = Vec::new();
    let mut finished = false;
    run_batch(&config, &FixtureConverter::new(), |p| match p {
        BatchProgress::FileStarted { name, percent, .. } => started.push((name.clone(), *percent)),
        BatchProgress::Finished { files, cancelled } => {
            finished = *files == 2 && !*cancelled;
        }
        _ => {}
    })
    .unwrap();

    assert_eq!(
        started,
        vec![
            ("Parcels.GEOJSON".to_string(), 0),
            ("Roads.geojson".to_string(), 50)
        ]
    );
    assert!(finished);
}

/// The JSON report reflects the batch.
#[test]
fn e2e_report_written() {
    let input = make_input();
    let output = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(input.path(), output.path());

    let summary = run_batch(&config, &FixtureConverter::new(), |_| {}).unwrap();
    let report_path = output.path().join("report.json");
    report::save_report(&summary, &report_path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(value["files"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["params"]["geometry_column"], "the_geom");
}

// =============================================================================
// Failure paths
// =============================================================================

/// A missing input folder fails before the tool runs or output is created.
#[test]
fn e2e_missing_input_fails_before_tool() {
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("sql");
    let config = BatchConfig::new(output.path().join("does-not-exist"), &out_dir);

    let converter = FixtureConverter::new();
    let result = run_batch(&config, &converter, |_| {});

    assert!(
        matches!(
            result,
            Err(GeoInsertError::Discovery(DiscoveryError::InputNotFound { .. }))
        ),
        "expected InputNotFound, got {result:?}"
    );
    assert_eq!(converter.calls.get(), 0);
    assert!(!out_dir.exists(), "output dir must not be created");
}

/// A folder without GeoJSON files fails without creating output.
#[test]
fn e2e_no_geojson_fails_without_output() {
    let input = tempfile::tempdir().unwrap();
    fs::write(input.path().join("readme.txt"), "nothing here").unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("sql");
    let config = BatchConfig::new(input.path(), &out_dir);

    let converter = FixtureConverter::new();
    let result = run_batch(&config, &converter, |_| {});

    assert!(matches!(
        result,
        Err(GeoInsertError::Discovery(DiscoveryError::NoGeoJsonFiles { .. }))
    ));
    assert_eq!(converter.calls.get(), 0);
    assert!(!out_dir.exists(), "output dir must not be created");
}

/// A tool failure aborts the batch; later files are not attempted.
#[test]
fn e2e_tool_failure_aborts_batch() {
    let input = make_input();
    fs::write(input.path().join("zones.geojson"), "{}").unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(input.path(), output.path());

    // Order is parcels, roads, zones: fail on roads.
    let converter = FixtureConverter::failing_on(1);
    let result = run_batch(&config, &converter, |_| {});

    assert!(matches!(
        result,
        Err(GeoInsertError::Convert(ConvertError::ToolFailed { .. }))
    ));
    assert_eq!(converter.calls.get(), 2, "zones must not be attempted");
    assert!(output.path().join("parcels.sql").exists());
    assert!(!output.path().join("roads.sql").exists());
    assert!(!output.path().join("zones.sql").exists());
}

/// A missing ogr2ogr binary surfaces as ToolNotFound.
#[test]
fn e2e_missing_ogr2ogr_reported() {
    let input = make_input();
    let output = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(input.path(), output.path());

    let converter = Ogr2Ogr::new(output.path().join("no-such-ogr2ogr"));
    let result = run_batch(&config, &converter, |_| {});

    assert!(
        matches!(
            result,
            Err(GeoInsertError::Convert(ConvertError::ToolNotFound { .. }))
        ),
        "expected ToolNotFound, got {result:?}"
    );
    assert!(sql_files(output.path()).is_empty());
}
