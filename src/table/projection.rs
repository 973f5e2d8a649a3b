//! Year-gap projection
//!
//! Fills the requested year range for one entity series. Missing years chain
//! from the value emitted for the previous year of the same walk, so
//! consecutive projections compound.
//!
//! A synthesized year is flagged as projected only when it lies after the last
//! real year of the series. Gaps before the first real year start from zero
//! and stay unflagged.

use super::aux_index::YearSeries;
use super::values::TableValues;

/// Return one value per year of `range_of_years`, in order
///
/// Pure: `series` is never modified.
pub fn fill_year_gaps<V: TableValues>(
    series: &YearSeries<V>,
    range_of_years: &[i32],
    growth_rate: f64,
) -> Vec<V> {
    let last_year_with_data = series.keys().next_back().copied();
    let mut filled: Vec<V> = Vec::with_capacity(range_of_years.len());

    for &year in range_of_years {
        let next = match series.get(&year) {
            Some(values) => values.clone(),
            None => {
                let is_projected = last_year_with_data.is_none_or(|last| year > last);
                match filled.last() {
                    Some(previous) => previous.grown(year, growth_rate, is_projected),
                    None => {
                        let mut seed = V::zeroed(year);
                        seed.set_projected(is_projected);
                        seed
                    }
                }
            }
        };
        filled.push(next);
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::values::{PlainValues, ScenarioVsScenarioValues};
    use approx::assert_relative_eq;

    fn plain(year: i32, value: f64) -> PlainValues {
        PlainValues {
            year,
            value,
            is_projected: false,
        }
    }

    #[test]
    fn test_forward_gap_is_projected() {
        let series: YearSeries<PlainValues> = [(2020, plain(2020, 30.0))].into_iter().collect();

        let filled = fill_year_gaps(&series, &[2020, 2021], 1.5);

        assert_eq!(filled.len(), 2);
        assert!(!filled[0].is_projected);
        assert_relative_eq!(filled[1].value, 30.45, epsilon = 1e-9);
        assert!(filled[1].is_projected);
    }

    #[test]
    fn test_projections_compound() {
        let series: YearSeries<PlainValues> = [(2020, plain(2020, 100.0))].into_iter().collect();

        let filled = fill_year_gaps(&series, &[2020, 2021, 2022], 1.5);

        assert_relative_eq!(filled[1].value, 101.5, epsilon = 1e-9);
        assert_relative_eq!(filled[2].value, 103.0225, epsilon = 1e-9);
    }

    #[test]
    fn test_interior_gap_is_not_projected() {
        let series: YearSeries<PlainValues> = [(2020, plain(2020, 10.0)), (2022, plain(2022, 50.0))]
            .into_iter()
            .collect();

        let filled = fill_year_gaps(&series, &[2020, 2021, 2022], 1.5);

        assert_relative_eq!(filled[1].value, 10.15, epsilon = 1e-9);
        assert!(!filled[1].is_projected);
        assert_relative_eq!(filled[2].value, 50.0);
    }

    #[test]
    fn test_backward_gap_starts_from_zero_unflagged() {
        let series: YearSeries<PlainValues> = [(2021, plain(2021, 8.0))].into_iter().collect();

        let filled = fill_year_gaps(&series, &[2019, 2020, 2021], 1.5);

        assert_relative_eq!(filled[0].value, 0.0);
        assert_relative_eq!(filled[1].value, 0.0);
        assert!(!filled[0].is_projected);
        assert!(!filled[1].is_projected);
        assert_relative_eq!(filled[2].value, 8.0);
    }

    #[test]
    fn test_empty_series_is_projected_zero() {
        let series: YearSeries<ScenarioVsScenarioValues> = YearSeries::new();

        let filled = fill_year_gaps(&series, &[2020, 2021], 1.5);

        assert!(filled.iter().all(|values| values.is_projected));
        assert!(filled
            .iter()
            .all(|values| values.base_scenario_value == 0.0 && values.percentage_difference == 0.0));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let series: YearSeries<PlainValues> = [(2018, plain(2018, 3.0)), (2020, plain(2020, 7.0))]
            .into_iter()
            .collect();
        let range = [2017, 2018, 2019, 2020, 2021, 2022];

        assert_eq!(
            fill_year_gaps(&series, &range, 1.5),
            fill_year_gaps(&series, &range, 1.5)
        );
    }
}
