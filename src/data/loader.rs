use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::error::{DatasetError, Result};

use super::model::{MetadataRow, MetadataTable, MetadataValue};

/// File name of the PTB-XL metadata table inside the dataset folder.
pub const DATABASE_FILE: &str = "ptbxl_database.csv";

/// Column that identifies a row.
pub const ID_COLUMN: &str = "ecg_id";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load `ptbxl_database.csv` from a dataset folder.
pub fn load_database(base: &Path) -> Result<MetadataTable> {
    load_csv(&base.join(DATABASE_FILE), ID_COLUMN)
}

/// Load a metadata CSV keyed by `id_column`.
///
/// The first row is the header. Every other column becomes metadata with its
/// type guessed per cell.
pub fn load_csv(path: &Path, id_column: &str) -> Result<MetadataTable> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_csv(file, id_column)?;
    log::info!(
        "loaded {} metadata rows ({} columns) from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

/// Parse a metadata CSV from any reader.
pub fn read_csv<R: Read>(input: R, id_column: &str) -> Result<MetadataTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let id_idx = headers
        .iter()
        .position(|h| h == id_column)
        .ok_or_else(|| DatasetError::Metadata(format!("missing '{id_column}' column")))?;

    let column_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != id_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;

        let id = guess_metadata_type(record.get(id_idx).unwrap_or(""));
        if id == MetadataValue::Null {
            return Err(DatasetError::Metadata(format!(
                "row {row_no}: empty '{id_column}'"
            )));
        }

        let mut values = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if col_idx == id_idx {
                continue;
            }
            values.insert(headers[col_idx].clone(), guess_metadata_type(value));
        }

        rows.push(MetadataRow { id, values });
    }

    Ok(MetadataTable {
        id_column: id_column.to_string(),
        column_names,
        rows,
    })
}

/// Collect the string column `column` in row order.
///
/// Every cell must be non-empty text; numbers are accepted and rendered back to
/// text so that purely numeric file names still work.
pub fn string_column(table: &MetadataTable, column: &str) -> Result<Vec<String>> {
    if !table.has_column(column) {
        return Err(DatasetError::Metadata(format!("missing '{column}' column")));
    }
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| match row.values.get(column) {
            Some(MetadataValue::Null) | None => Err(DatasetError::Metadata(format!(
                "row {i}: empty '{column}'"
            ))),
            Some(v) => Ok(v.to_string()),
        })
        .collect()
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    let s = s.trim();
    if s.is_empty() {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    match s {
        "true" | "True" => MetadataValue::Bool(true),
        "false" | "False" => MetadataValue::Bool(false),
        _ => MetadataValue::String(s.to_string()),
    }
}
