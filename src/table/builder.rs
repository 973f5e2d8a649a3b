//! Generic table pipeline
//!
//! Index → project → aggregate → year totals, once per indicator, for any
//! value shape. Mode-specific work (reconciliation, sorting, pagination,
//! tonnage, ranking) happens around this in the service.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::aggregate::{aggregate_forest, sum_root_rows, EntitySeries};
use super::aux_index::build_aux_index;
use super::projection::fill_year_gaps;
use super::values::TableValues;
use crate::error::{ImpactError, ImpactResult};
use crate::response::{IndicatorMetadata, IndicatorTable};
use crate::types::{EntityNode, GroupBy, Indicator, TableRecord};

/// Inputs shared by every indicator of one table request
#[derive(Debug, Clone, Copy)]
pub struct TableContext<'a> {
    /// Resolved indicators, in request order
    pub indicators: &'a [Indicator],
    pub entities: &'a [EntityNode],
    pub group_by: GroupBy,
    pub range_of_years: &'a [i32],
    pub growth_rate: f64,
}

#[derive(Debug, Clone)]
pub struct BuiltTables<V> {
    pub tables: Vec<IndicatorTable<V>>,
    /// Largest year present in the flat rows
    pub last_year_with_data: Option<i32>,
}

pub fn build_indicator_tables<R, V, F>(
    context: &TableContext<'_>,
    records: &[R],
    convert: F,
) -> ImpactResult<BuiltTables<V>>
where
    R: TableRecord,
    V: TableValues,
    F: Fn(&R) -> V,
{
    let (mut index, last_year_with_data) = build_aux_index(records, convert);

    if let Some(unknown) = index
        .keys()
        .find(|id| !context.indicators.iter().any(|indicator| &indicator.id == *id))
    {
        return Err(ImpactError::IndicatorNotFound(unknown.clone()));
    }

    debug!(
        "Indexed {} rows across {} indicators (last year with data: {:?})",
        records.len(),
        index.len(),
        last_year_with_data
    );

    let mut tables = Vec::with_capacity(context.indicators.len());

    for indicator in context.indicators {
        let entities = index.remove(&indicator.id).unwrap_or_default();

        let series: EntitySeries<V> = entities
            .into_iter()
            .map(|(entity_id, years)| {
                let filled = fill_year_gaps(&years, context.range_of_years, context.growth_rate);
                (entity_id, filled)
            })
            .collect::<FxHashMap<_, _>>();

        let rows = aggregate_forest(context.entities, &series, context.range_of_years);
        let year_sum = sum_root_rows(&rows, context.range_of_years);

        tables.push(IndicatorTable {
            indicator_id: indicator.id.clone(),
            indicator_short_name: indicator.short_name.clone(),
            group_by: context.group_by,
            rows,
            year_sum,
            metadata: IndicatorMetadata {
                unit: indicator.unit.clone(),
            },
        });
    }

    Ok(BuiltTables {
        tables,
        last_year_with_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::values::PlainValues;
    use crate::types::ImpactRecord;
    use approx::assert_relative_eq;

    fn record(indicator: &str, entity: &str, year: i32, impact: f64) -> ImpactRecord {
        ImpactRecord {
            indicator_id: indicator.to_string(),
            entity_id: entity.to_string(),
            entity_name: entity.to_string(),
            year,
            impact,
            tonnes: 0.0,
            type_by_intervention: None,
        }
    }

    fn indicator(id: &str) -> Indicator {
        Indicator {
            id: id.to_string(),
            short_name: id.to_uppercase(),
            unit: "tCO2e".to_string(),
        }
    }

    #[test]
    fn test_region_round_trip() {
        let indicators = vec![indicator("ind1")];
        let entities = vec![EntityNode::new("R", "Region").with_children(vec![
            EntityNode::new("A1", "A"),
            EntityNode::new("A2", "B"),
        ])];
        let range = [2020, 2021];
        let context = TableContext {
            indicators: &indicators,
            entities: &entities,
            group_by: GroupBy::Region,
            range_of_years: &range,
            growth_rate: 1.5,
        };
        let rows = vec![
            record("ind1", "A1", 2020, 10.0),
            record("ind1", "A2", 2020, 30.0),
            record("ind1", "A1", 2021, 5.0),
        ];

        let built = build_indicator_tables(&context, &rows, PlainValues::from_record).unwrap();
        let table = &built.tables[0];
        let region = &table.rows[0];
        let (a1, a2) = (&region.children[0], &region.children[1]);

        assert_eq!(built.last_year_with_data, Some(2021));
        assert_relative_eq!(a1.values[1].value, 5.0);
        assert!(!a1.values[1].is_projected);
        assert_relative_eq!(a2.values[1].value, 30.45, epsilon = 1e-9);
        assert!(a2.values[1].is_projected);
        assert_relative_eq!(region.values[0].value, 40.0);
        assert_relative_eq!(region.values[1].value, 35.45, epsilon = 1e-9);
        assert!(region.values[1].is_projected);
        assert_relative_eq!(table.year_sum[1].value, 35.45, epsilon = 1e-9);
        assert_eq!(table.metadata.unit, "tCO2e");
    }

    #[test]
    fn test_tables_follow_indicator_order() {
        let indicators = vec![indicator("b"), indicator("a")];
        let entities = vec![EntityNode::new("X", "X")];
        let range = [2020];
        let context = TableContext {
            indicators: &indicators,
            entities: &entities,
            group_by: GroupBy::Material,
            range_of_years: &range,
            growth_rate: 1.5,
        };

        let built =
            build_indicator_tables(&context, &[record("a", "X", 2020, 1.0)], PlainValues::from_record)
                .unwrap();

        let ids: Vec<&str> = built.tables.iter().map(|t| t.indicator_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_relative_eq!(built.tables[0].rows[0].values[0].value, 0.0);
        assert_relative_eq!(built.tables[1].rows[0].values[0].value, 1.0);
    }

    #[test]
    fn test_rows_for_unknown_indicator_fail() {
        let indicators = vec![indicator("known")];
        let range = [2020];
        let context = TableContext {
            indicators: &indicators,
            entities: &[],
            group_by: GroupBy::Material,
            range_of_years: &range,
            growth_rate: 1.5,
        };

        let result = build_indicator_tables(
            &context,
            &[record("ghost", "X", 2020, 1.0)],
            PlainValues::from_record,
        );

        match result {
            Err(ImpactError::IndicatorNotFound(id)) => assert_eq!(id, "ghost"),
            other => panic!("expected IndicatorNotFound, got {:?}", other.map(|b| b.tables.len())),
        }
    }
}
