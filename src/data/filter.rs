use std::collections::{BTreeMap, BTreeSet};

use super::model::{MetadataTable, MetadataValue};

// ---------------------------------------------------------------------------
// Row selection by metadata values
// ---------------------------------------------------------------------------

/// Per-column selection: column_name → set of accepted values.
/// Columns absent from the map are not constrained.
pub type FilterState = BTreeMap<String, BTreeSet<MetadataValue>>;

/// Build a filter accepting `values` in `column`.
pub fn accept<I>(column: &str, values: I) -> FilterState
where
    I: IntoIterator<Item = MetadataValue>,
{
    let mut filters = FilterState::new();
    filters.insert(column.to_string(), values.into_iter().collect());
    filters
}

/// Return positions of rows that pass all filters.
///
/// A row passes a column filter when:
/// * the accepted set is non-empty and contains the row's value, or
/// * the row has no value for the column and `Null` is accepted.
///
/// An empty accepted set rejects every row.
pub fn filtered_indices(table: &MetadataTable, filters: &FilterState) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            filters.iter().all(|(col, selected)| {
                let value = row.values.get(col).unwrap_or(&MetadataValue::Null);
                selected.contains(value)
            })
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    const CSV: &str = "\
ecg_id,sex,strat_fold
1,0,1
2,1,9
3,1,10
4,0,10
";

    #[test]
    fn selects_matching_rows() {
        let table = read_csv(CSV.as_bytes(), "ecg_id").unwrap();
        let test_fold = accept("strat_fold", [MetadataValue::Integer(10)]);
        assert_eq!(filtered_indices(&table, &test_fold), vec![2, 3]);
    }

    #[test]
    fn all_columns_must_match() {
        let table = read_csv(CSV.as_bytes(), "ecg_id").unwrap();
        let mut filters = accept("strat_fold", [MetadataValue::Integer(10)]);
        filters.insert("sex".into(), [MetadataValue::Integer(0)].into_iter().collect());
        assert_eq!(filtered_indices(&table, &filters), vec![3]);
    }

    #[test]
    fn empty_selection_rejects_everything() {
        let table = read_csv(CSV.as_bytes(), "ecg_id").unwrap();
        let filters = accept("sex", []);
        assert!(filtered_indices(&table, &filters).is_empty());
        assert_eq!(filtered_indices(&table, &FilterState::new()).len(), 4);
    }

    #[test]
    fn unknown_column_matches_only_null() {
        let table = read_csv(CSV.as_bytes(), "ecg_id").unwrap();
        let filters = accept("age", [MetadataValue::Null]);
        assert_eq!(filtered_indices(&table, &filters).len(), 4);
    }
}
