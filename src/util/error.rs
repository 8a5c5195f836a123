// GeoInsert - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all GeoInsert operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum GeoInsertError {
    /// Input discovery failed.
    Discovery(DiscoveryError),

    /// Converting or filtering a single file failed.
    Convert(ConvertError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Writing the batch report failed.
    Report(ReportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for GeoInsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "{e}"),
            Self::Convert(e) => write!(f, "Conversion error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Report(e) => write!(f, "Report error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for GeoInsertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Convert(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Report(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to locating input GeoJSON files.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The input directory does not exist or is not accessible.
    InputNotFound { path: PathBuf },

    /// The input path exists but is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied reading the input directory.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The input directory contains no `.geojson` files.
    NoGeoJsonFiles { path: PathBuf },

    /// Two inputs map to the same lowercased table name.
    DuplicateTable {
        table: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputNotFound { path } => {
                write!(f, "Invalid input directory '{}'", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Input path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::NoGeoJsonFiles { path } => {
                write!(
                    f,
                    "No GeoJSON files found in input folder '{}'",
                    path.display()
                )
            }
            Self::DuplicateTable {
                table,
                first,
                second,
            } => write!(
                f,
                "'{}' and '{}' both map to table '{table}'; rename one of them",
                first.display(),
                second.display()
            ),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for GeoInsertError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Conversion errors
// ---------------------------------------------------------------------------

/// Errors raised while converting one GeoJSON file.
#[derive(Debug)]
pub enum ConvertError {
    /// The conversion program could not be found on PATH.
    ToolNotFound { program: PathBuf },

    /// The conversion program could not be started.
    Spawn { program: PathBuf, source: io::Error },

    /// The conversion program exited unsuccessfully.
    ToolFailed {
        program: PathBuf,
        source_file: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The tool reported success but left no dump behind.
    MissingDump { path: PathBuf },

    /// Reading the raw dump or writing the filtered file failed.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolNotFound { program } => write!(
                f,
                "'{}' not found. GDAL (ogr2ogr) must be installed and on PATH, \
                 or pass --ogr2ogr with its location.",
                program.display()
            ),
            Self::Spawn { program, source } => {
                write!(f, "Failed to start '{}': {source}", program.display())
            }
            Self::ToolFailed {
                program,
                source_file,
                exit_code,
                stderr,
            } => {
                let code = exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                write!(
                    f,
                    "'{}' failed on '{}' (exit {code})",
                    program.display(),
                    source_file.display()
                )?;
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            Self::MissingDump { path } => {
                write!(f, "Expected SQL dump '{}' was not created", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConvertError> for GeoInsertError {
    fn from(e: ConvertError) -> Self {
        Self::Convert(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for GeoInsertError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors writing the JSON batch report.
#[derive(Debug)]
pub enum ReportError {
    /// I/O error writing the report file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Report I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON report error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ReportError> for GeoInsertError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

/// Convenience type alias for GeoInsert results.
pub type Result<T> = std::result::Result<T, GeoInsertError>;
