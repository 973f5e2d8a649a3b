//! Total purchased volume by year
//!
//! Computed from the raw tonnage of the flat rows, independent of indicator
//! aggregation. Missing years are projected with the same compounding growth
//! as impact values.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::TableRecord;
use crate::utils::grow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedTonnes {
    pub year: i32,
    pub value: f64,
    pub is_projected: bool,
}

/// Sum tonnage per year over `records`, filling gaps in `range_of_years`
///
/// When `halve` is set every emitted value is divided by two (scenario
/// overlay on plain and ranked tables).
pub fn total_purchased_volume_by_year<R: TableRecord>(
    records: &[R],
    range_of_years: &[i32],
    growth_rate: f64,
    halve: bool,
) -> Vec<PurchasedTonnes> {
    let mut by_year: FxHashMap<i32, f64> = FxHashMap::default();
    for record in records {
        let tonnes = record.tonnes();
        let tonnes = if tonnes.is_finite() { tonnes } else { 0.0 };
        *by_year.entry(record.year()).or_insert(0.0) += tonnes;
    }
    let last_year_with_data = by_year.keys().copied().max();

    let mut series: Vec<PurchasedTonnes> = Vec::with_capacity(range_of_years.len());
    for &year in range_of_years {
        let next = match by_year.get(&year) {
            Some(&value) => PurchasedTonnes {
                year,
                value,
                is_projected: false,
            },
            None => PurchasedTonnes {
                year,
                value: series.last().map_or(0.0, |previous| grow(previous.value, growth_rate)),
                is_projected: last_year_with_data.is_none_or(|last| year > last),
            },
        };
        series.push(next);
    }

    if halve {
        series.iter_mut().for_each(|tonnes| tonnes.value /= 2.0);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImpactRecord;
    use approx::assert_relative_eq;

    fn record(year: i32, tonnes: f64) -> ImpactRecord {
        ImpactRecord {
            indicator_id: "ind1".to_string(),
            entity_id: "X".to_string(),
            entity_name: "X".to_string(),
            year,
            impact: 0.0,
            tonnes,
            type_by_intervention: None,
        }
    }

    #[test]
    fn test_sums_and_projects() {
        let rows = vec![record(2020, 100.0), record(2020, 50.0), record(2021, 200.0)];

        let tonnes = total_purchased_volume_by_year(&rows, &[2020, 2021, 2022], 1.5, false);

        assert_relative_eq!(tonnes[0].value, 150.0);
        assert!(!tonnes[0].is_projected);
        assert_relative_eq!(tonnes[1].value, 200.0);
        assert_relative_eq!(tonnes[2].value, 203.0, epsilon = 1e-9);
        assert!(tonnes[2].is_projected);
    }

    #[test]
    fn test_halved_with_scenario() {
        let rows = vec![record(2020, 100.0)];

        let tonnes = total_purchased_volume_by_year(&rows, &[2020, 2021], 1.5, true);

        assert_relative_eq!(tonnes[0].value, 50.0);
        assert_relative_eq!(tonnes[1].value, 50.75, epsilon = 1e-9);
    }

    #[test]
    fn test_no_data_is_projected_zero() {
        let rows: Vec<ImpactRecord> = Vec::new();

        let tonnes = total_purchased_volume_by_year(&rows, &[2020, 2021], 1.5, false);

        assert!(tonnes.iter().all(|t| t.value == 0.0 && t.is_projected));
    }

    #[test]
    fn test_non_finite_tonnage_counts_as_zero() {
        let rows = vec![record(2020, f64::NAN), record(2020, 4.0)];

        let tonnes = total_purchased_volume_by_year(&rows, &[2020], 1.5, false);

        assert_relative_eq!(tonnes[0].value, 4.0);
    }
}
