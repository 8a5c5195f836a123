// GeoInsert - platform/ogr.rs
//
// ogr2ogr invocation.
//
// `Ogr2Ogr` is the production `DumpConverter`: one blocking subprocess per
// job, no timeout.

use crate::core::converter::DumpConverter;
use crate::core::model::ConversionJob;
use crate::util::constants;
use crate::util::error::ConvertError;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Argument list for one ogr2ogr run (program name excluded).
///
/// Order matters to ogr2ogr: the destination precedes the source.
pub fn ogr2ogr_args(job: &ConversionJob) -> Vec<OsString> {
    let params = &job.params;
    vec![
        "-f".into(),
        constants::OGR_OUTPUT_FORMAT.into(),
        job.dump_path.clone().into_os_string(),
        job.source.clone().into_os_string(),
        "-nln".into(),
        job.qualified_table.clone().into(),
        "-nlt".into(),
        constants::OGR_GEOMETRY_TYPE.into(),
        "-lco".into(),
        format!("GEOMETRY_NAME={}", params.geometry_column).into(),
        "-lco".into(),
        format!("SRID={}", params.srid).into(),
        "-lco".into(),
        "ADD_CONSTRAINTS=NO".into(),
        "-lco".into(),
        "SPATIAL_INDEX=NO".into(),
        "--config".into(),
        "PGCLIENTENCODING".into(),
        params.client_encoding.clone().into(),
    ]
}

/// Runs the GDAL `ogr2ogr` binary.
#[derive(Debug, Clone)]
pub struct Ogr2Ogr {
    program: PathBuf,
}

impl Ogr2Ogr {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, job: &ConversionJob) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(ogr2ogr_args(job))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Keep a console window from flashing up for every file when the
        // binary runs from a GUI-launched process.
        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

impl Default for Ogr2Ogr {
    fn default() -> Self {
        Self::new(constants::DEFAULT_OGR2OGR_PROGRAM)
    }
}

impl DumpConverter for Ogr2Ogr {
    fn convert(&self, job: &ConversionJob) -> Result<(), ConvertError> {
        tracing::debug!(
            program = %self.program.display(),
            source = %job.source.display(),
            dump = %job.dump_path.display(),
            table = %job.qualified_table,
            "Running ogr2ogr"
        );

        let output = self.command(job).output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ConvertError::ToolNotFound {
                    program: self.program.clone(),
                }
            } else {
                ConvertError::Spawn {
                    program: self.program.clone(),
                    source: e,
                }
            }
        })?;

        let stderr = tail_utf8_lossy(&output.stderr, constants::MAX_TOOL_STDERR_BYTES);

        if !output.status.success() {
            return Err(ConvertError::ToolFailed {
                program: self.program.clone(),
                source_file: job.source.clone(),
                exit_code: output.status.code(),
                stderr,
            });
        }

        // GDAL prints non-fatal warnings (e.g. field truncation) on stderr.
        if !stderr.is_empty() {
            tracing::warn!(source = %job.source.display(), output = %stderr, "ogr2ogr reported warnings");
        }

        Ok(())
    }
}

/// Last `max_bytes` of `bytes` as trimmed, lossily decoded text.
///
/// The tail is kept because GDAL puts the actual failure reason last.
fn tail_utf8_lossy(bytes: &[u8], max_bytes: usize) -> String {
    let start = bytes.len().saturating_sub(max_bytes);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ConversionParams;

    fn make_job() -> ConversionJob {
        ConversionJob {
            source: PathBuf::from("in/Roads.geojson"),
            dump_path: PathBuf::from("out/_temp_sql/roads.sql"),
            qualified_table: "gis.roads".to_string(),
            params: ConversionParams {
                schema: "gis".to_string(),
                srid: 3857,
                geometry_column: "geom".to_string(),
                client_encoding: "LATIN1".to_string(),
            },
        }
    }

    #[test]
    fn test_args_follow_pgdump_layout() {
        let args: Vec<String> = ogr2ogr_args(&make_job())
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();

        assert_eq!(
            args,
            vec![
                "-f",
                "PGDump",
                "out/_temp_sql/roads.sql",
                "in/Roads.geojson",
                "-nln",
                "gis.roads",
                "-nlt",
                "GEOMETRY",
                "-lco",
                "GEOMETRY_NAME=geom",
                "-lco",
                "SRID=3857",
                "-lco",
                "ADD_CONSTRAINTS=NO",
                "-lco",
                "SPATIAL_INDEX=NO",
                "--config",
                "PGCLIENTENCODING",
                "LATIN1",
            ]
        );
    }

    #[test]
    fn test_tail_keeps_end_of_output() {
        assert_eq!(tail_utf8_lossy(b"  first\nlast line\n", 10), "last line");
        assert_eq!(tail_utf8_lossy(b"", 10), "");
    }

    #[test]
    fn test_missing_program_is_tool_not_found() {
        let converter = Ogr2Ogr::new("geoinsert-no-such-ogr2ogr-binary");
        let result = converter.convert(&make_job());
        assert!(
            matches!(result, Err(ConvertError::ToolNotFound { .. })),
            "got {result:?}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_tool_failed() {
        let converter = Ogr2Ogr::new("false");
        match converter.convert(&make_job()) {
            Err(ConvertError::ToolFailed {
                exit_code,
                source_file,
                ..
            }) => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(source_file, PathBuf::from("in/Roads.geojson"));
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_success() {
        let converter = Ogr2Ogr::new("true");
        assert!(converter.convert(&make_job()).is_ok());
    }
}
