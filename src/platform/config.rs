// GeoInsert - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::ConversionParams;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Lowest SRID accepted (0 means "unknown" to PostGIS).
pub const MIN_SRID: i32 = 0;

/// Highest SRID PostGIS accepts in `spatial_ref_sys`.
pub const MAX_SRID: i32 = 999_999;

/// Resolved platform paths for GeoInsert configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/geoinsert/ or %APPDATA%\GeoInsert\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[conversion]` section.
    pub conversion: ConversionSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[conversion]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ConversionSection {
    /// Target schema for generated tables.
    pub schema: Option<String>,
    /// Spatial reference id.
    pub srid: Option<i64>,
    /// Geometry column name.
    pub geometry_column: Option<String>,
    /// PGCLIENTENCODING value.
    pub client_encoding: Option<String>,
    /// Path to the ogr2ogr binary.
    pub ogr2ogr_path: Option<String>,
    /// Keep raw dumps in `_temp_sql` after a successful batch.
    pub keep_temp: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Conversion defaults used when the CLI does not override them.
    pub params: ConversionParams,
    /// ogr2ogr program name or path.
    pub ogr2ogr_program: PathBuf,
    /// Keep raw dumps after a successful batch.
    pub keep_temp: bool,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            params: ConversionParams::default(),
            ogr2ogr_program: PathBuf::from(constants::DEFAULT_OGR2OGR_PROGRAM),
            keep_temp: true,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
///
/// When `required` is false (the platform default location), a missing file
/// yields defaults with no warnings and an unreadable or unparseable file
/// yields defaults plus a warning. When `required` is true (a path the user
/// passed explicitly) those cases are errors.
///
/// Out-of-range values never fail the load: each produces a warning and the
/// field keeps its default.
pub fn load_config(
    config_path: &Path,
    required: bool,
) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let mut warnings: Vec<String> = Vec::new();

    if !required && !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return Ok((AppConfig::default(), warnings));
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) if required => {
            return Err(ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            });
        }
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return Ok((AppConfig::default(), warnings));
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) if required => {
            return Err(ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            });
        }
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return Ok((AppConfig::default(), warnings));
        }
    };

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");

    let config = apply_raw(raw, &mut warnings);
    Ok((config, warnings))
}

/// Validate each field of `raw`, accumulating warnings for rejected values.
fn apply_raw(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();
    let conv = raw.conversion;

    if let Some(schema) = conv.schema {
        match check_identifier("schema", &schema) {
            Ok(()) => config.params.schema = schema,
            Err(reason) => warnings.push(format!(
                "[conversion] schema = \"{schema}\" {reason}. Using default ({}).",
                constants::DEFAULT_SCHEMA
            )),
        }
    }

    if let Some(srid) = conv.srid {
        match i32::try_from(srid) {
            Ok(s) if (MIN_SRID..=MAX_SRID).contains(&s) => config.params.srid = s,
            _ => warnings.push(format!(
                "[conversion] srid = {srid} is out of range ({MIN_SRID}-{MAX_SRID}). Using default ({}).",
                constants::DEFAULT_SRID
            )),
        }
    }

    if let Some(column) = conv.geometry_column {
        match check_identifier("geometry_column", &column) {
            Ok(()) => config.params.geometry_column = column,
            Err(reason) => warnings.push(format!(
                "[conversion] geometry_column = \"{column}\" {reason}. Using default ({}).",
                constants::DEFAULT_GEOMETRY_COLUMN
            )),
        }
    }

    if let Some(encoding) = conv.client_encoding {
        if encoding.trim().is_empty() {
            warnings.push(format!(
                "[conversion] client_encoding is empty. Using default ({}).",
                constants::DEFAULT_CLIENT_ENCODING
            ));
        } else {
            config.params.client_encoding = encoding;
        }
    }

    if let Some(path) = conv.ogr2ogr_path {
        if !path.is_empty() {
            config.ogr2ogr_program = PathBuf::from(path);
        }
    }

    if let Some(keep) = conv.keep_temp {
        config.keep_temp = keep;
    }

    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(PathBuf::from(file));
        }
    }

    config
}

/// Check final conversion parameters (after CLI overrides are merged).
pub fn validate_params(params: &ConversionParams) -> Result<(), ConfigError> {
    let out_of_range = |field: &str, value: String, reason: String| ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value,
        expected: reason,
    };

    check_identifier("schema", &params.schema)
        .map_err(|r| out_of_range("schema", params.schema.clone(), r))?;
    check_identifier("geometry_column", &params.geometry_column)
        .map_err(|r| out_of_range("geometry_column", params.geometry_column.clone(), r))?;

    if !(MIN_SRID..=MAX_SRID).contains(&params.srid) {
        return Err(out_of_range(
            "srid",
            params.srid.to_string(),
            format!("an integer in {MIN_SRID}-{MAX_SRID}"),
        ));
    }
    if params.client_encoding.trim().is_empty() {
        return Err(out_of_range(
            "client_encoding",
            String::new(),
            "a non-empty encoding name".to_string(),
        ));
    }
    Ok(())
}

/// Names end up inside `schema.table` and `-lco` options, so they must be
/// non-empty and free of whitespace and dots.
fn check_identifier(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '.') {
        return Err(format!("{field} must not contain whitespace or '.'"));
    }
    Ok(())
}
