// GeoInsert - core/converter.rs
//
// The seam between batch orchestration and the external conversion tool.
// The production implementation lives in `platform::ogr`; tests drive the
// batch with in-process fakes.

use crate::core::model::{ConversionJob, ConversionParams, SourceFile};
use crate::core::naming;
use crate::util::error::ConvertError;
use std::path::{Path, PathBuf};

/// Produces a raw PostGIS SQL dump for one GeoJSON file.
pub trait DumpConverter {
    /// Convert `job.source` into `job.dump_path`.
    fn convert(&self, job: &ConversionJob) -> Result<(), ConvertError>;
}

/// Build the job for `source`, dumping into `temp_dir`.
pub fn plan_job(source: &SourceFile, temp_dir: &Path, params: &ConversionParams) -> ConversionJob {
    ConversionJob {
        source: source.path.clone(),
        dump_path: temp_dir.join(naming::output_file_name(&source.table)),
        qualified_table: naming::qualified_table(&params.schema, &source.table),
        params: params.clone(),
    }
}

/// Final INSERT-only file for `source` inside `output_dir`.
pub fn output_path_for(source: &SourceFile, output_dir: &Path) -> PathBuf {
    output_dir.join(naming::output_file_name(&source.table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_job() {
        let source = SourceFile {
            path: PathBuf::from("in/Roads.geojson"),
            file_name: "Roads.geojson".to_string(),
            table: "roads".to_string(),
        };
        let params = ConversionParams {
            schema: "staging".to_string(),
            ..Default::default()
        };
        let job = plan_job(&source, Path::new("out/_temp_sql"), &params);
        assert_eq!(job.source, PathBuf::from("in/Roads.geojson"));
        assert_eq!(job.dump_path, PathBuf::from("out/_temp_sql/roads.sql"));
        assert_eq!(job.qualified_table, "staging.roads");
        assert_eq!(
            output_path_for(&source, Path::new("out")),
            PathBuf::from("out/roads.sql")
        );
    }
}
