//! Auxiliary index: indicator → entity id → year → values
//!
//! Built once per table request in a single pass over the reconciled rows.
//! Rows sharing a key are accumulated, and the largest year seen is tracked on
//! the way so callers never scan the rows twice.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::values::TableValues;
use crate::types::TableRecord;

pub type YearSeries<V> = BTreeMap<i32, V>;

pub type AuxIndexMap<V> = FxHashMap<String, FxHashMap<String, YearSeries<V>>>;

/// Index `records` by indicator, entity id and year
///
/// Returns the index and the largest year present in the rows (`None` when
/// there are no rows).
pub fn build_aux_index<R, V, F>(records: &[R], convert: F) -> (AuxIndexMap<V>, Option<i32>)
where
    R: TableRecord,
    V: TableValues,
    F: Fn(&R) -> V,
{
    let mut index: AuxIndexMap<V> = FxHashMap::default();
    let mut max_year: Option<i32> = None;

    for record in records {
        let values = convert(record);

        let series = index
            .entry(record.indicator_id().to_string())
            .or_default()
            .entry(record.entity_id().to_string())
            .or_default();

        match series.get_mut(&record.year()) {
            Some(existing) => existing.accumulate(&values),
            None => {
                series.insert(record.year(), values);
            }
        }

        max_year = Some(max_year.map_or(record.year(), |year| year.max(record.year())));
    }

    for entities in index.values_mut() {
        for series in entities.values_mut() {
            series.values_mut().for_each(TableValues::refresh_derived);
        }
    }

    (index, max_year)
}
