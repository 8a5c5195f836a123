// GeoInsert - core/discovery.rs
//
// Input folder validation and GeoJSON file discovery.
//
// Only direct children of the input folder are considered. Each accepted
// file maps to exactly one table, so discovery also rejects inputs whose
// lowercased stems collide before anything is written.
//
//   - Per-entry I/O errors are non-fatal and collected as warnings.
//   - Failing to list the folder itself is fatal.

use crate::core::model::SourceFile;
use crate::core::naming;
use crate::util::constants;
use crate::util::error::DiscoveryError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Discover `.geojson` files (case-insensitive) directly inside `input_dir`.
///
/// Returns the accepted files sorted by file name, plus human-readable
/// warnings for entries that could not be read.
///
/// # Fatal errors
/// - `InputNotFound` / `NotADirectory` / `PermissionDenied` when the folder
///   itself is unusable.
/// - `PermissionDenied` when the folder exists but cannot be listed.
/// - `NoGeoJsonFiles` when nothing matched.
/// - `DuplicateTable` when two files map to the same table name.
pub fn discover_sources(
    input_dir: &Path,
) -> Result<(Vec<SourceFile>, Vec<String>), DiscoveryError> {
    validate_input_dir(input_dir)?;

    let pattern = source_pattern();
    let match_opts = glob::MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let mut sources: Vec<SourceFile> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                let msg = e.to_string();
                let source = e.into_io_error().unwrap_or_else(|| io::Error::other(msg));
                return Err(DiscoveryError::PermissionDenied {
                    path: input_dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if !pattern
            .as_ref()
            .is_some_and(|p| p.matches_with(file_name, match_opts))
        {
            tracing::trace!(file = file_name, "Not a GeoJSON file");
            continue;
        }

        let Some(table) = naming::table_name_for(path) else {
            warnings.push(format!("Skipping '{}': cannot derive table name", path.display()));
            continue;
        };

        sources.push(SourceFile {
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            table,
        });
    }

    if sources.is_empty() {
        return Err(DiscoveryError::NoGeoJsonFiles {
            path: input_dir.to_path_buf(),
        });
    }

    sources.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    check_unique_tables(&sources)?;

    tracing::debug!(
        input = %input_dir.display(),
        files = sources.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((sources, warnings))
}

/// Check that `input_dir` exists and is a directory.
///
/// Uses `fs::metadata` rather than `Path::is_dir` so that permission
/// failures are reported as such instead of as a missing folder.
pub fn validate_input_dir(input_dir: &Path) -> Result<(), DiscoveryError> {
    match std::fs::metadata(input_dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoveryError::NotADirectory {
            path: input_dir.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(DiscoveryError::PermissionDenied {
                path: input_dir.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(DiscoveryError::InputNotFound {
            path: input_dir.to_path_buf(),
        }),
    }
}

fn source_pattern() -> Option<glob::Pattern> {
    match glob::Pattern::new(constants::SOURCE_FILE_PATTERN) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::warn!(
                pattern = constants::SOURCE_FILE_PATTERN,
                error = %e,
                "Invalid source pattern, no file will match"
            );
            None
        }
    }
}

fn check_unique_tables(sources: &[SourceFile]) -> Result<(), DiscoveryError> {
    let mut seen: HashMap<&str, &PathBuf> = HashMap::new();
    for source in sources {
        if let Some(first) = seen.insert(source.table.as_str(), &source.path) {
            return Err(DiscoveryError::DuplicateTable {
                table: source.table.clone(),
                first: first.clone(),
                second: source.path.clone(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
