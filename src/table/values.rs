//! Per-year row values for the three table variants
//!
//! `TableValues` is the seam between the generic pipeline (index, projector,
//! aggregator, sorter) and the mode-specific numeric fields:
//! - `PlainValues`: impact only
//! - `ActualVsScenarioValues`: actual impact vs one scenario
//! - `ScenarioVsScenarioValues`: base scenario vs compared scenario

use serde::{Deserialize, Serialize};

use crate::types::{ActualVsScenarioRecord, ImpactRecord, ScenarioVsScenarioRecord};
use crate::utils::{grow, percentage_difference};

pub trait TableValues: Clone + std::fmt::Debug + Serialize {
    /// All numeric fields zero, not projected
    fn zeroed(year: i32) -> Self;

    fn year(&self) -> i32;

    fn is_projected(&self) -> bool;

    fn set_projected(&mut self, projected: bool);

    /// Add every tracked numeric field of `other` and OR its projected flag.
    /// Derived fields are left stale until `refresh_derived`.
    fn accumulate(&mut self, other: &Self);

    /// Synthesize the next year from this one, growing each tracked field
    fn grown(&self, year: i32, growth_rate: f64, is_projected: bool) -> Self;

    /// Recompute differences from the summed fields
    fn refresh_derived(&mut self) {}

    /// Metric sibling rows are ordered by for a sorting year
    fn sort_metric(&self) -> f64;
}

// ============================================================================
// Plain
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainValues {
    pub year: i32,
    pub value: f64,
    pub is_projected: bool,
}

impl PlainValues {
    pub fn from_record(record: &ImpactRecord) -> Self {
        Self {
            year: record.year,
            value: record.impact,
            is_projected: false,
        }
    }
}

impl TableValues for PlainValues {
    fn zeroed(year: i32) -> Self {
        Self {
            year,
            value: 0.0,
            is_projected: false,
        }
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn is_projected(&self) -> bool {
        self.is_projected
    }

    fn set_projected(&mut self, projected: bool) {
        self.is_projected = projected;
    }

    fn accumulate(&mut self, other: &Self) {
        self.value += other.value;
        self.is_projected = self.is_projected || other.is_projected;
    }

    fn grown(&self, year: i32, growth_rate: f64, is_projected: bool) -> Self {
        Self {
            year,
            value: grow(self.value, growth_rate),
            is_projected,
        }
    }

    /// Plain tables have no difference column: they sort by impact
    fn sort_metric(&self) -> f64 {
        self.value
    }
}

// ============================================================================
// Actual vs Scenario
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualVsScenarioValues {
    pub year: i32,
    /// Actual impact
    pub value: f64,
    pub compared_scenario_value: f64,
    /// compared − actual
    pub absolute_difference: f64,
    pub percentage_difference: f64,
    pub is_projected: bool,
}

impl ActualVsScenarioValues {
    pub fn new(year: i32, value: f64, compared_scenario_value: f64, is_projected: bool) -> Self {
        let mut values = Self {
            year,
            value,
            compared_scenario_value,
            absolute_difference: 0.0,
            percentage_difference: 0.0,
            is_projected,
        };
        values.refresh_derived();
        values
    }

    pub fn from_record(record: &ActualVsScenarioRecord) -> Self {
        Self::new(record.year, record.impact, record.scenario_impact, false)
    }
}

impl TableValues for ActualVsScenarioValues {
    fn zeroed(year: i32) -> Self {
        Self::new(year, 0.0, 0.0, false)
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn is_projected(&self) -> bool {
        self.is_projected
    }

    fn set_projected(&mut self, projected: bool) {
        self.is_projected = projected;
    }

    fn accumulate(&mut self, other: &Self) {
        self.value += other.value;
        self.compared_scenario_value += other.compared_scenario_value;
        self.is_projected = self.is_projected || other.is_projected;
    }

    fn grown(&self, year: i32, growth_rate: f64, is_projected: bool) -> Self {
        Self::new(
            year,
            grow(self.value, growth_rate),
            grow(self.compared_scenario_value, growth_rate),
            is_projected,
        )
    }

    fn refresh_derived(&mut self) {
        self.absolute_difference = self.compared_scenario_value - self.value;
        self.percentage_difference =
            percentage_difference(self.value, self.compared_scenario_value);
    }

    fn sort_metric(&self) -> f64 {
        self.absolute_difference
    }
}

// ============================================================================
// Scenario vs Scenario
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioVsScenarioValues {
    pub year: i32,
    pub base_scenario_value: f64,
    pub compared_scenario_value: f64,
    /// compared − base
    pub absolute_difference: f64,
    pub percentage_difference: f64,
    pub is_projected: bool,
}

impl ScenarioVsScenarioValues {
    pub fn new(
        year: i32,
        base_scenario_value: f64,
        compared_scenario_value: f64,
        is_projected: bool,
    ) -> Self {
        let mut values = Self {
            year,
            base_scenario_value,
            compared_scenario_value,
            absolute_difference: 0.0,
            percentage_difference: 0.0,
            is_projected,
        };
        values.refresh_derived();
        values
    }

    pub fn from_record(record: &ScenarioVsScenarioRecord) -> Self {
        Self::new(
            record.year,
            record.base_scenario_impact,
            record.compared_scenario_impact,
            false,
        )
    }
}

impl TableValues for ScenarioVsScenarioValues {
    fn zeroed(year: i32) -> Self {
        Self::new(year, 0.0, 0.0, false)
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn is_projected(&self) -> bool {
        self.is_projected
    }

    fn set_projected(&mut self, projected: bool) {
        self.is_projected = projected;
    }

    fn accumulate(&mut self, other: &Self) {
        self.base_scenario_value += other.base_scenario_value;
        self.compared_scenario_value += other.compared_scenario_value;
        self.is_projected = self.is_projected || other.is_projected;
    }

    fn grown(&self, year: i32, growth_rate: f64, is_projected: bool) -> Self {
        Self::new(
            year,
            grow(self.base_scenario_value, growth_rate),
            grow(self.compared_scenario_value, growth_rate),
            is_projected,
        )
    }

    fn refresh_derived(&mut self) {
        self.absolute_difference = self.compared_scenario_value - self.base_scenario_value;
        self.percentage_difference =
            percentage_difference(self.base_scenario_value, self.compared_scenario_value);
    }

    fn sort_metric(&self) -> f64 {
        self.absolute_difference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_actual_vs_scenario_derived_fields() {
        let values = ActualVsScenarioValues::new(2020, 100.0, 120.0, false);
        assert_relative_eq!(values.absolute_difference, 20.0);
        // 100 * 20 / 110
        assert_relative_eq!(values.percentage_difference, 18.181_818, epsilon = 1e-5);
    }

    #[test]
    fn test_accumulate_then_refresh() {
        let mut total = ScenarioVsScenarioValues::zeroed(2021);
        total.accumulate(&ScenarioVsScenarioValues::new(2021, 10.0, 5.0, false));
        total.accumulate(&ScenarioVsScenarioValues::new(2021, 10.0, 25.0, true));
        total.refresh_derived();

        assert_relative_eq!(total.base_scenario_value, 20.0);
        assert_relative_eq!(total.compared_scenario_value, 30.0);
        assert_relative_eq!(total.absolute_difference, 10.0);
        assert_relative_eq!(total.percentage_difference, 40.0);
        assert!(total.is_projected);
    }

    #[test]
    fn test_grown_applies_to_every_field() {
        let previous = ActualVsScenarioValues::new(2020, 200.0, 100.0, false);
        let next = previous.grown(2021, 1.5, true);

        assert_eq!(next.year, 2021);
        assert_relative_eq!(next.value, 203.0, epsilon = 1e-9);
        assert_relative_eq!(next.compared_scenario_value, 101.5, epsilon = 1e-9);
        assert_relative_eq!(next.absolute_difference, -101.5, epsilon = 1e-9);
        assert!(next.is_projected);
    }

    #[test]
    fn test_zeroed_has_no_nan() {
        let values = ScenarioVsScenarioValues::zeroed(2020);
        assert_eq!(values.percentage_difference, 0.0);
        assert_eq!(values.absolute_difference, 0.0);
    }

    #[test]
    fn test_plain_serializes_camel_case() {
        let json = serde_json::to_value(PlainValues {
            year: 2020,
            value: 1.0,
            is_projected: true,
        })
        .unwrap();
        assert_eq!(json["isProjected"], true);
        assert_eq!(json["year"], 2020);
    }
}
