//! Turning per-file tag lookups into table rows.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::tags::{single_value, TagMap, TagReader};
use crate::config::{ColumnSource, ColumnSpec};

/// One file's cell values, ordered like the enabled columns.
pub type Row = Vec<String>;

/// Build one row per file for the enabled `columns`.
///
/// A file whose tags cannot be read still gets a row: its file cell is
/// filled and every tag cell is blank.
pub fn build_rows(
    files: &[PathBuf],
    columns: &[ColumnSpec],
    reader: &dyn TagReader,
) -> Vec<Row> {
    let needs_tags = columns
        .iter()
        .any(|c| c.enabled && matches!(c.source, ColumnSource::Tag(_)));

    files
        .iter()
        .map(|file| {
            let tags = if needs_tags {
                reader.read_tags(file).unwrap_or_else(|e| {
                    warn!("Failed to read tags: {}", e);
                    TagMap::new()
                })
            } else {
                TagMap::new()
            };
            build_row(file, columns, &tags)
        })
        .collect()
}

/// Build a single row from already-read tags.
///
/// Tag cells hold the value only when the tag has exactly one; absent and
/// multi-valued tags both leave the cell empty.
pub fn build_row(file: &Path, columns: &[ColumnSpec], tags: &TagMap) -> Row {
    columns
        .iter()
        .filter(|c| c.enabled)
        .map(|column| match column.source {
            ColumnSource::FilePath => file_label(file),
            ColumnSource::Tag(key) => single_value(tags, key).unwrap_or_default().to_string(),
        })
        .collect()
}

/// The text shown for a file in the file column.
pub fn file_label(file: &Path) -> String {
    file.file_name()
        .unwrap_or(file.as_os_str())
        .to_string_lossy()
        .into_owned()
}
