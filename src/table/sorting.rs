//! Sibling ordering by one year's metric
//!
//! Sorting is stable, so ties keep entity tree order. Without a sorting year
//! the rows are left untouched.

use std::cmp::Ordering;

use super::values::TableValues;
use crate::response::{IndicatorTable, TableRow};
use crate::types::SortingOrder;

fn metric_for_year<V: TableValues>(row: &TableRow<V>, year: i32) -> f64 {
    row.values
        .iter()
        .find(|values| values.year() == year)
        .map_or(0.0, TableValues::sort_metric)
}

pub fn sort_rows_recursively<V: TableValues>(
    rows: &mut [TableRow<V>],
    sorting_year: i32,
    order: SortingOrder,
) {
    for row in rows.iter_mut() {
        sort_rows_recursively(&mut row.children, sorting_year, order);
    }

    rows.sort_by(|a, b| {
        let ordering: Ordering =
            metric_for_year(a, sorting_year).total_cmp(&metric_for_year(b, sorting_year));
        match order {
            SortingOrder::Asc => ordering,
            SortingOrder::Desc => ordering.reverse(),
        }
    });
}

/// Sort every indicator's row tree; no-op when `sorting_year` is `None`
pub fn sort_indicator_tables<V: TableValues>(
    tables: &mut [IndicatorTable<V>],
    sorting_year: Option<i32>,
    sorting_order: Option<SortingOrder>,
) {
    let Some(year) = sorting_year else {
        return;
    };
    let order = sorting_order.unwrap_or_default();

    for table in tables.iter_mut() {
        sort_rows_recursively(&mut table.rows, year, order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::IndicatorMetadata;
    use crate::table::values::ActualVsScenarioValues;
    use crate::types::GroupBy;

    fn row(
        id: &str,
        actual: f64,
        scenario: f64,
        children: Vec<TableRow<ActualVsScenarioValues>>,
    ) -> TableRow<ActualVsScenarioValues> {
        TableRow {
            id: id.to_string(),
            name: id.to_string(),
            children,
            values: vec![ActualVsScenarioValues::new(2020, actual, scenario, false)],
        }
    }

    fn ids<V>(rows: &[TableRow<V>]) -> Vec<&str> {
        rows.iter().map(|row| row.id.as_str()).collect()
    }

    fn table(rows: Vec<TableRow<ActualVsScenarioValues>>) -> IndicatorTable<ActualVsScenarioValues> {
        IndicatorTable {
            indicator_id: "ind1".to_string(),
            indicator_short_name: "Ind".to_string(),
            group_by: GroupBy::Material,
            rows,
            year_sum: Vec::new(),
            metadata: IndicatorMetadata {
                unit: "t".to_string(),
            },
        }
    }

    #[test]
    fn test_sorts_by_absolute_difference_desc_by_default() {
        let mut tables = vec![table(vec![
            row("small", 10.0, 11.0, vec![]),
            row("large", 10.0, 50.0, vec![]),
            row("negative", 10.0, 0.0, vec![]),
        ])];

        sort_indicator_tables(&mut tables, Some(2020), None);

        assert_eq!(ids(&tables[0].rows), vec!["large", "small", "negative"]);
    }

    #[test]
    fn test_sorts_children_too() {
        let mut rows = vec![row(
            "parent",
            0.0,
            0.0,
            vec![row("a", 0.0, 2.0, vec![]), row("b", 0.0, 1.0, vec![])],
        )];

        sort_rows_recursively(&mut rows, 2020, SortingOrder::Asc);

        assert_eq!(ids(&rows[0].children), vec!["b", "a"]);
    }

    #[test]
    fn test_missing_year_counts_as_zero() {
        let mut rows = vec![row("positive", 0.0, 5.0, vec![]), row("minus", 5.0, 0.0, vec![])];

        sort_rows_recursively(&mut rows, 1999, SortingOrder::Asc);

        assert_eq!(ids(&rows), vec!["positive", "minus"]);
    }

    #[test]
    fn test_without_sorting_year_order_is_unchanged() {
        let original = vec![
            row("c", 0.0, 1.0, vec![]),
            row("a", 0.0, 9.0, vec![]),
            row("b", 0.0, 5.0, vec![]),
        ];
        let mut tables = vec![table(original.clone())];

        sort_indicator_tables(&mut tables, None, Some(SortingOrder::Asc));

        assert_eq!(tables[0].rows, original);
    }
}
