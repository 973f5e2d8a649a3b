//! Comparison Reconciler
//!
//! Folds scenario rows (rows carrying an intervention marker) into the actual
//! rows sharing their `indicatorId + entityId + year` key.
//!
//! Duplicate keys inside one series are summed, never rejected. Output order is
//! first-seen key order: matched actual rows first, then scenario-only rows.

use rustc_hash::FxHashMap;

use crate::types::{
    ActualVsScenarioRecord, ImpactRecord, RecordKey, ScenarioVsScenarioRecord, TableRecord,
};

/// Insertion-ordered accumulator keyed by `RecordKey`
struct KeyedRows<T> {
    index: FxHashMap<RecordKey, usize>,
    rows: Vec<T>,
}

impl<T> KeyedRows<T> {
    fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            rows: Vec::new(),
        }
    }

    fn get_mut(&mut self, key: &RecordKey) -> Option<&mut T> {
        let position = *self.index.get(key)?;
        self.rows.get_mut(position)
    }

    /// Merge into the existing row for `key`, or insert `row`
    fn upsert(&mut self, key: RecordKey, row: T, merge: impl FnOnce(&mut T, T)) {
        match self.index.get(&key) {
            Some(&position) => merge(&mut self.rows[position], row),
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    fn into_rows(self) -> Vec<T> {
        self.rows
    }
}

fn is_actual(record: &ImpactRecord) -> bool {
    record.type_by_intervention.is_none()
}

/// Reconcile one scenario-aware series into actual-vs-scenario rows
///
/// Actual rows start with `scenarioImpact = impact` (untouched locations keep
/// their value under the scenario). Each scenario row adds its impact to the
/// matching actual row's `scenarioImpact`; without a match it becomes a
/// scenario-only row with `impact = 0`.
///
/// Tonnage stays the actual tonnage on matched keys; scenario-only rows carry
/// their own scenario tonnage.
pub fn reconcile_actual_vs_scenario(records: &[ImpactRecord]) -> Vec<ActualVsScenarioRecord> {
    let mut actual: KeyedRows<ActualVsScenarioRecord> = KeyedRows::new();

    for record in records.iter().filter(|record| is_actual(record)) {
        actual.upsert(
            record.key(),
            ActualVsScenarioRecord {
                indicator_id: record.indicator_id.clone(),
                entity_id: record.entity_id.clone(),
                entity_name: record.entity_name.clone(),
                year: record.year,
                impact: record.impact,
                scenario_impact: record.impact,
                tonnes: record.tonnes,
            },
            |existing, duplicate| {
                existing.impact += duplicate.impact;
                existing.scenario_impact += duplicate.scenario_impact;
                existing.tonnes += duplicate.tonnes;
            },
        );
    }

    let mut scenario_only: KeyedRows<ActualVsScenarioRecord> = KeyedRows::new();

    for record in records.iter().filter(|record| !is_actual(record)) {
        let key = record.key();
        if let Some(matching) = actual.get_mut(&key) {
            matching.scenario_impact += record.impact;
            continue;
        }

        scenario_only.upsert(
            key,
            ActualVsScenarioRecord {
                indicator_id: record.indicator_id.clone(),
                entity_id: record.entity_id.clone(),
                entity_name: record.entity_name.clone(),
                year: record.year,
                impact: 0.0,
                scenario_impact: record.impact,
                tonnes: record.tonnes,
            },
            |existing, duplicate| {
                existing.scenario_impact += duplicate.scenario_impact;
                existing.tonnes += duplicate.tonnes;
            },
        );
    }

    let mut result = actual.into_rows();
    result.extend(scenario_only.into_rows());
    result
}

/// Fold scenario rows into the actual impact for a plain table
///
/// Matching actual rows get `impact += scenario impact`; unmatched scenario
/// rows are kept as they are.
/// Scenario tonnage is ignored on matched keys and kept on unmatched rows.
pub fn merge_scenario_into_actual(records: &[ImpactRecord]) -> Vec<ImpactRecord> {
    let mut actual: KeyedRows<ImpactRecord> = KeyedRows::new();

    for record in records.iter().filter(|record| is_actual(record)) {
        actual.upsert(record.key(), record.clone(), |existing, duplicate| {
            existing.impact += duplicate.impact;
            existing.tonnes += duplicate.tonnes;
        });
    }

    let mut scenario_only: KeyedRows<ImpactRecord> = KeyedRows::new();

    for record in records.iter().filter(|record| !is_actual(record)) {
        let key = record.key();
        if let Some(matching) = actual.get_mut(&key) {
            matching.impact += record.impact;
            continue;
        }
        scenario_only.upsert(key, record.clone(), |existing, duplicate| {
            existing.impact += duplicate.impact;
            existing.tonnes += duplicate.tonnes;
        });
    }

    let mut result = actual.into_rows();
    result.extend(scenario_only.into_rows());
    result
}

/// Reconcile two scenario-aware series independently against actual data,
/// then union them by key
///
/// On collision the two scenario values are summed per side and the first
/// row's tonnage is kept: both sides carry the same actual tonnage.
pub fn reconcile_scenario_vs_scenario(
    base_series: &[ImpactRecord],
    compared_series: &[ImpactRecord],
) -> Vec<ScenarioVsScenarioRecord> {
    let base = reconcile_actual_vs_scenario(base_series)
        .into_iter()
        .map(|record| ScenarioVsScenarioRecord {
            base_scenario_impact: record.scenario_impact,
            compared_scenario_impact: 0.0,
            indicator_id: record.indicator_id,
            entity_id: record.entity_id,
            entity_name: record.entity_name,
            year: record.year,
            tonnes: record.tonnes,
        });

    let compared = reconcile_actual_vs_scenario(compared_series)
        .into_iter()
        .map(|record| ScenarioVsScenarioRecord {
            base_scenario_impact: 0.0,
            compared_scenario_impact: record.scenario_impact,
            indicator_id: record.indicator_id,
            entity_id: record.entity_id,
            entity_name: record.entity_name,
            year: record.year,
            tonnes: record.tonnes,
        });

    let mut merged: KeyedRows<ScenarioVsScenarioRecord> = KeyedRows::new();
    for record in base.chain(compared) {
        merged.upsert(record.key(), record, |existing, other| {
            existing.base_scenario_impact += other.base_scenario_impact;
            existing.compared_scenario_impact += other.compared_scenario_impact;
        });
    }

    merged.into_rows()
}
