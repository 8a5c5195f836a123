// GeoInsert - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// Conversion parameters
// =============================================================================

/// Settings forwarded to ogr2ogr for every file in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionParams {
    /// Schema that every generated table is qualified with.
    pub schema: String,

    /// Spatial reference id of the geometry column.
    pub srid: i32,

    /// Name of the geometry column.
    pub geometry_column: String,

    /// Value for the `PGCLIENTENCODING` config option.
    pub client_encoding: String,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            schema: constants::DEFAULT_SCHEMA.to_string(),
            srid: constants::DEFAULT_SRID,
            geometry_column: constants::DEFAULT_GEOMETRY_COLUMN.to_string(),
            client_encoding: constants::DEFAULT_CLIENT_ENCODING.to_string(),
        }
    }
}

// =============================================================================
// Inputs and jobs
// =============================================================================

/// A GeoJSON file accepted by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Absolute or caller-relative path to the GeoJSON file.
    pub path: PathBuf,

    /// File name as found on disk (used in progress messages).
    pub file_name: String,

    /// Unqualified table name: the lowercased file stem.
    pub table: String,
}

/// One invocation of the conversion tool.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// GeoJSON file to convert.
    pub source: PathBuf,

    /// Where the tool writes its raw SQL dump.
    pub dump_path: PathBuf,

    /// `schema.table` name passed as the new layer name.
    pub qualified_table: String,

    pub params: ConversionParams,
}

// =============================================================================
// Results
// =============================================================================

/// Line counts from filtering one dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Insert statements copied to the output.
    pub kept: u64,

    /// Lines discarded (DDL, SET, comments, blank lines).
    pub dropped: u64,
}

/// Result of converting one source file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub table: String,
    pub output: PathBuf,
    pub stats: FilterStats,
    pub elapsed_ms: u64,
}

/// Result of a whole batch, serialised as the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Directory holding raw dumps, `None` once it has been cleaned up.
    pub temp_dir: Option<PathBuf>,

    pub params: ConversionParams,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileOutcome>,

    /// True when the batch stopped early on request.
    pub cancelled: bool,
}

impl BatchSummary {
    /// Insert statements written across all files.
    pub fn total_inserts(&self) -> u64 {
        self.files.iter().map(|f| f.stats.kept).sum()
    }

    /// Lines discarded across all files.
    pub fn total_dropped(&self) -> u64 {
        self.files.iter().map(|f| f.stats.dropped).sum()
    }
}

// =============================================================================
// Progress
// =============================================================================

/// Progress events emitted by a batch run.
#[derive(Debug, Clone)]
pub enum BatchProgress {
    /// Sources discovered; conversion is about to begin.
    Started { total: usize },

    /// Conversion of one file is starting.
    FileStarted {
        index: usize,
        total: usize,
        name: String,
        percent: u8,
    },

    /// One file has been converted and filtered.
    FileCompleted {
        index: usize,
        total: usize,
        outcome: FileOutcome,
    },

    /// The batch ended, either normally or by cancellation.
    Finished { files: usize, cancelled: bool },
}

/// Percentage reported when file `index` (0-based) of `total` starts.
///
/// Truncates like integer division, so the first file reports 0 and the
/// last never reaches 100 before `Finished`.
pub fn percent_for(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((index.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ConversionParams::default();
        assert_eq!(params.schema, "gis");
        assert_eq!(params.srid, 4326);
        assert_eq!(params.geometry_column, "the_geom");
        assert_eq!(params.client_encoding, "UTF-8");
    }

    #[test]
    fn test_percent_for() {
        assert_eq!(percent_for(0, 4), 0);
        assert_eq!(percent_for(1, 4), 25);
        assert_eq!(percent_for(2, 3), 66);
        assert_eq!(percent_for(0, 0), 100);
    }

    #[test]
    fn test_summary_totals() {
        let outcome = |kept, dropped| FileOutcome {
            source: PathBuf::from("a.geojson"),
            table: "a".to_string(),
            output: PathBuf::from("a.sql"),
            stats: FilterStats { kept, dropped },
            elapsed_ms: 0,
        };
        let now = Utc::now();
        let summary = BatchSummary {
            input_dir: PathBuf::from("in"),
            output_dir: PathBuf::from("out"),
            temp_dir: None,
            params: ConversionParams::default(),
            started_at: now,
            finished_at: now,
            files: vec![outcome(3, 10), outcome(5, 7)],
            cancelled: false,
        };
        assert_eq!(summary.total_inserts(), 8);
        assert_eq!(summary.total_dropped(), 17);
    }
}
