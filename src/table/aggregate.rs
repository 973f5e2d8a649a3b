//! Tree aggregation
//!
//! Builds a fresh `TableRow` tree from the entity skeleton, post-order:
//! every node's yearly values are its own series plus the sum of its
//! children's. The skeleton itself is only borrowed.

use rustc_hash::FxHashMap;

use super::values::TableValues;
use crate::response::TableRow;
use crate::types::EntityNode;

/// Projected series per entity id, aligned with the requested year range
pub type EntitySeries<V> = FxHashMap<String, Vec<V>>;

fn accumulate_into<V: TableValues>(totals: &mut [V], series: &[V]) {
    for (total, values) in totals.iter_mut().zip(series) {
        total.accumulate(values);
    }
}

pub fn aggregate_tree<V: TableValues>(
    node: &EntityNode,
    series: &EntitySeries<V>,
    range_of_years: &[i32],
) -> TableRow<V> {
    let mut values: Vec<V> = range_of_years.iter().map(|&year| V::zeroed(year)).collect();

    if let Some(own) = series.get(&node.id) {
        accumulate_into(&mut values, own);
    }

    let children: Vec<TableRow<V>> = node
        .children
        .iter()
        .map(|child| aggregate_tree(child, series, range_of_years))
        .collect();

    for child in &children {
        accumulate_into(&mut values, &child.values);
    }

    values.iter_mut().for_each(TableValues::refresh_derived);

    TableRow {
        id: node.id.clone(),
        name: node.name.clone(),
        children,
        values,
    }
}

pub fn aggregate_forest<V: TableValues>(
    entities: &[EntityNode],
    series: &EntitySeries<V>,
    range_of_years: &[i32],
) -> Vec<TableRow<V>> {
    entities
        .iter()
        .map(|entity| aggregate_tree(entity, series, range_of_years))
        .collect()
}

/// Per-year totals across root rows (children are already folded into them)
pub fn sum_root_rows<V: TableValues>(rows: &[TableRow<V>], range_of_years: &[i32]) -> Vec<V> {
    let mut totals: Vec<V> = range_of_years.iter().map(|&year| V::zeroed(year)).collect();
    for row in rows {
        accumulate_into(&mut totals, &row.values);
    }
    totals.iter_mut().for_each(TableValues::refresh_derived);
    totals
}
