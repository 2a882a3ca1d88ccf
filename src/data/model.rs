use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// MetadataValue – a single cell of the metadata table
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata cell mirroring the dtypes a CSV column can
/// take. `Ord` so values can live in `BTreeSet`s for filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put MetadataValue in BTreeSet --

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use MetadataValue::*;
        fn rank(v: &MetadataValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for MetadataValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            MetadataValue::String(s) => s.hash(state),
            MetadataValue::Integer(i) => i.hash(state),
            MetadataValue::Float(f) => f.to_bits().hash(state),
            MetadataValue::Bool(b) => b.hash(state),
            MetadataValue::Null => {}
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

impl MetadataValue {
    /// Interpret the value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            MetadataValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Whether the value is numerically equal to `-1`, the "no label" marker.
    pub fn is_missing_marker(&self) -> bool {
        matches!(self, MetadataValue::Integer(-1))
            || matches!(self, MetadataValue::Float(v) if *v == -1.0)
    }
}

// ---------------------------------------------------------------------------
// MetadataRow / MetadataTable – the loaded ptbxl_database.csv
// ---------------------------------------------------------------------------

/// One row of the metadata table.
#[derive(Debug, Clone)]
pub struct MetadataRow {
    /// Value of the row identifier column (`ecg_id`).
    pub id: MetadataValue,
    /// Every other column: column_name → value.
    pub values: BTreeMap<String, MetadataValue>,
}

/// The metadata table, in file order. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct MetadataTable {
    /// Name of the identifier column the rows are keyed by.
    pub id_column: String,
    /// Non-identifier column names in header order.
    pub column_names: Vec<String>,
    pub rows: Vec<MetadataRow>,
}

impl MetadataTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Cell at (`row`, `column`). `None` when either is out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<&MetadataValue> {
        self.rows.get(row).and_then(|r| r.values.get(column))
    }

    /// Position of the row whose identifier equals `id`.
    pub fn position_of(&self, id: &MetadataValue) -> Option<usize> {
        self.rows.iter().position(|r| &r.id == id)
    }

    /// Sorted set of distinct values found in `column`.
    pub fn unique_values(&self, column: &str) -> BTreeSet<MetadataValue> {
        self.rows
            .iter()
            .filter_map(|r| r.values.get(column))
            .cloned()
            .collect()
    }
}
