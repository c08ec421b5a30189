//! Manifest parsing for geomirror
//!
//! The manifest is a tab-separated file produced by an upstream collaborator.
//! Each row describes one root URL to mirror: a required `source` column plus
//! optional `millesime` (vintage/year) and `format` columns. Only the root
//! URLs and the optional format filter are consumed here; everything else in
//! the manifest belongs to the collaborator.

use crate::ManifestError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// One manifest row
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestRow {
    /// Root URL of a remote subtree to mirror
    pub source: String,

    /// Vintage/year annotation, when the manifest carries one
    #[serde(default)]
    pub millesime: Option<String>,

    /// Data format annotation, when the manifest carries one
    #[serde(default)]
    pub format: Option<String>,
}

/// A parsed manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    pub rows: Vec<ManifestRow>,

    /// Whether the manifest header carried a `format` column; a format
    /// filter is meaningless without one
    pub has_format_column: bool,
}

impl Manifest {
    /// Distinct non-empty values of the `format` column, sorted
    pub fn available_formats(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter_map(|row| row.format.as_deref())
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Loads a tab-separated manifest from `path`
///
/// # Returns
///
/// * `Ok(Manifest)` - Parsed rows plus header information
/// * `Err(ManifestError)` - The file is unreadable, a row is malformed, or
///   the `source` column is missing
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "source") {
        return Err(ManifestError::MissingColumn("source"));
    }
    let has_format_column = headers.iter().any(|h| h == "format");

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: ManifestRow = result?;
        rows.push(row);
    }

    Ok(Manifest {
        rows,
        has_format_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_manifest(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_manifest() {
        let file = create_manifest(
            "source\tmillesime\tformat\n\
             https://example.org/a/\t2024\tshp\n\
             https://example.org/b/\t2023\tedigeo\n",
        );

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.rows.len(), 2);
        assert!(manifest.has_format_column);
        assert_eq!(manifest.rows[0].source, "https://example.org/a/");
        assert_eq!(manifest.rows[0].millesime.as_deref(), Some("2024"));
        assert_eq!(manifest.rows[1].format.as_deref(), Some("edigeo"));
    }

    #[test]
    fn test_load_manifest_with_source_only() {
        let file = create_manifest("source\nhttps://example.org/a/\n");

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.rows.len(), 1);
        assert!(!manifest.has_format_column);
        assert_eq!(manifest.rows[0].millesime, None);
        assert_eq!(manifest.rows[0].format, None);
    }

    #[test]
    fn test_missing_source_column() {
        let file = create_manifest("url\tformat\nhttps://example.org/a/\tshp\n");

        let result = load_manifest(file.path());
        assert!(matches!(result, Err(ManifestError::MissingColumn("source"))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_manifest(Path::new("/nonexistent/manifest.tsv"));
        assert!(matches!(result, Err(ManifestError::Io(_))));
    }

    #[test]
    fn test_available_formats_are_distinct_and_sorted() {
        let file = create_manifest(
            "source\tformat\n\
             https://example.org/a/\tshp\n\
             https://example.org/b/\tedigeo\n\
             https://example.org/c/\tshp\n\
             https://example.org/d/\t\n",
        );

        let manifest = load_manifest(file.path()).unwrap();
        let formats: Vec<String> = manifest.available_formats().into_iter().collect();
        assert_eq!(formats, vec!["edigeo".to_string(), "shp".to_string()]);
    }

    #[test]
    fn test_empty_source_rows_are_kept() {
        // Rows with an empty source are surfaced to the orchestrator, which
        // counts them as failures rather than dropping them silently.
        let file = create_manifest("source\tformat\n\tshp\nhttps://example.org/a/\tshp\n");

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.rows.len(), 2);
        assert_eq!(manifest.rows[0].source, "");
    }
}
