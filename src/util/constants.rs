// GeoInsert - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "GeoInsert";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "GeoInsert";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Conversion defaults
// =============================================================================

/// Target schema that generated tables are qualified with.
pub const DEFAULT_SCHEMA: &str = "gis";

/// Spatial reference id written into the dump (WGS 84).
pub const DEFAULT_SRID: i32 = 4326;

/// Name of the geometry column in the generated tables.
pub const DEFAULT_GEOMETRY_COLUMN: &str = "the_geom";

/// Value passed to ogr2ogr as `PGCLIENTENCODING`.
pub const DEFAULT_CLIENT_ENCODING: &str = "UTF-8";

/// Program name (or path) of the GDAL vector conversion tool.
pub const DEFAULT_OGR2OGR_PROGRAM: &str = "ogr2ogr";

/// Output driver requested from ogr2ogr.
pub const OGR_OUTPUT_FORMAT: &str = "PGDump";

/// Geometry type forced on every layer so mixed collections load into one column.
pub const OGR_GEOMETRY_TYPE: &str = "GEOMETRY";

/// Maximum number of stderr bytes kept from a failed tool run.
pub const MAX_TOOL_STDERR_BYTES: usize = 8 * 1024;

// =============================================================================
// Discovery / naming
// =============================================================================

/// Filename pattern (matched case-insensitively) for input files.
pub const SOURCE_FILE_PATTERN: &str = "*.geojson";

/// Extension of the generated SQL files.
pub const OUTPUT_EXTENSION: &str = "sql";

/// Subdirectory of the output folder that receives raw ogr2ogr dumps.
pub const TEMP_DIR_NAME: &str = "_temp_sql";

// =============================================================================
// Filtering
// =============================================================================

/// Statement prefix that marks a line as a row insertion.
pub const INSERT_KEYWORD: &str = "INSERT INTO";

// =============================================================================
// Configuration / logging
// =============================================================================

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log level when neither RUST_LOG, --debug nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
