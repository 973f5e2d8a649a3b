//! Top-N ranking of root rows
//!
//! Root rows are ordered by their impact in the first requested year and cut
//! at `maxRankingEntities`. Whatever falls past the cut is summed per year
//! into an `others` block.

use serde::{Deserialize, Serialize};

use super::values::PlainValues;
use crate::response::{IndicatorTable, TableRow};
use crate::types::RankingSort;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingOthers {
    pub aggregated_values: Vec<AggregatedValue>,
    pub number_of_aggregated_entities: usize,
    pub sort: RankingSort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedIndicatorTable {
    #[serde(flatten)]
    pub table: IndicatorTable<PlainValues>,
    pub others: RankingOthers,
}

fn year_impact(row: &TableRow<PlainValues>, year: i32) -> f64 {
    row.values
        .iter()
        .find(|values| values.year == year)
        .map_or(0.0, |values| values.value)
}

pub fn apply_ranking(
    mut table: IndicatorTable<PlainValues>,
    range_of_years: &[i32],
    max_ranking_entities: usize,
    sort: RankingSort,
) -> RankedIndicatorTable {
    if let Some(&start_year) = range_of_years.first() {
        table.rows.sort_by(|a, b| {
            let ordering = year_impact(a, start_year).total_cmp(&year_impact(b, start_year));
            match sort {
                RankingSort::Asc => ordering,
                RankingSort::Des => ordering.reverse(),
            }
        });
    }

    let over_limit: Vec<TableRow<PlainValues>> = if table.rows.len() > max_ranking_entities {
        table.rows.split_off(max_ranking_entities)
    } else {
        Vec::new()
    };

    let aggregated_values = range_of_years
        .iter()
        .map(|&year| AggregatedValue {
            year,
            value: over_limit.iter().map(|row| year_impact(row, year)).sum(),
        })
        .collect();

    RankedIndicatorTable {
        table,
        others: RankingOthers {
            aggregated_values,
            number_of_aggregated_entities: over_limit.len(),
            sort,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::IndicatorMetadata;
    use crate::types::GroupBy;
    use approx::assert_relative_eq;

    fn row(id: &str, first: f64, second: f64) -> TableRow<PlainValues> {
        TableRow {
            id: id.to_string(),
            name: id.to_string(),
            children: Vec::new(),
            values: vec![
                PlainValues {
                    year: 2020,
                    value: first,
                    is_projected: false,
                },
                PlainValues {
                    year: 2021,
                    value: second,
                    is_projected: false,
                },
            ],
        }
    }

    fn table(rows: Vec<TableRow<PlainValues>>) -> IndicatorTable<PlainValues> {
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
    fn test_top_entities_and_others() {
        let rows = vec![row("a", 1.0, 10.0), row("b", 5.0, 1.0), row("c", 3.0, 2.0), row("d", 2.0, 4.0)];

        let ranked = apply_ranking(table(rows), &[2020, 2021], 2, RankingSort::Des);

        let ids: Vec<&str> = ranked.table.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(ranked.others.number_of_aggregated_entities, 2);
        assert_relative_eq!(ranked.others.aggregated_values[0].value, 3.0);
        assert_relative_eq!(ranked.others.aggregated_values[1].value, 14.0);
    }

    #[test]
    fn test_ascending_ranking() {
        let rows = vec![row("a", 9.0, 0.0), row("b", 1.0, 0.0)];

        let ranked = apply_ranking(table(rows), &[2020, 2021], 5, RankingSort::Asc);

        assert_eq!(ranked.table.rows[0].id, "b");
        assert_eq!(ranked.others.number_of_aggregated_entities, 0);
        assert!(ranked.others.aggregated_values.iter().all(|v| v.value == 0.0));
    }

    #[test]
    fn test_others_serialized_next_to_table_fields() {
        let ranked = apply_ranking(table(vec![row("a", 1.0, 1.0)]), &[2020, 2021], 1, RankingSort::Des);

        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["indicatorId"], "ind1");
        assert_eq!(json["others"]["sort"], "DES");
        assert_eq!(json["others"]["numberOfAggregatedEntities"], 0);
    }
}
