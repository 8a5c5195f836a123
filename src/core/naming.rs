// GeoInsert - core/naming.rs
//
// Table and output file naming derived from input file names.

use crate::util::constants;
use std::path::Path;

/// Table name for a GeoJSON file: its stem (last extension removed), lowercased.
///
/// Returns `None` when the path has no UTF-8 file stem.
pub fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// `schema.table`, as passed to ogr2ogr's `-nln`.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{schema}.{table}")
}

/// File name of the SQL file generated for `table`.
pub fn output_file_name(table: &str) -> String {
    format!("{table}.{}", constants::OUTPUT_EXTENSION)
}
