//! In-memory provider over a `SourcingDataset`
//!
//! Serves the entity tree, flat impact rows and indicator metadata the same
//! way a database-backed provider would:
//! - facts are filtered by indicator, year range, entity filters and scenario
//! - rows are grouped by (indicator, group-by entity, year, intervention
//!   marker) summing impact and tonnes
//! - trees contain every entity with matching facts plus its ancestors,
//!   siblings ordered by name

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::data::{EntityRecord, ImpactFact, SourcingDataset};
use crate::providers::{EntityTreeProvider, ImpactDataProvider, ImpactDataQuery, IndicatorProvider};
use crate::types::{
    Dimension, EntityFilters, EntityNode, GroupBy, ImpactRecord, Indicator, InterventionType,
};

#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    dataset: Arc<SourcingDataset>,
    /// entity id → position in `dataset.entities`
    entity_index: FxHashMap<String, usize>,
}

/// Which facts a fetch may see besides actual data
enum ScenarioScope<'a> {
    ActualOnly,
    Scenarios(&'a [String]),
}

impl ScenarioScope<'_> {
    fn admits(&self, fact: &ImpactFact) -> bool {
        match (&fact.scenario, self) {
            (None, _) => true,
            (Some(_), ScenarioScope::ActualOnly) => false,
            (Some(tag), ScenarioScope::Scenarios(ids)) => ids.contains(&tag.scenario_id),
        }
    }
}

fn admitted(list: &Option<Vec<String>>, value: &Option<String>) -> bool {
    match list {
        None => true,
        Some(ids) => value.as_ref().is_some_and(|value| ids.contains(value)),
    }
}

fn matches_filters(fact: &ImpactFact, filters: &EntityFilters) -> bool {
    admitted(&filters.material_ids, &fact.material_id)
        && admitted(&filters.origin_ids, &fact.origin_id)
        && admitted(&filters.t1_supplier_ids, &fact.t1_supplier_id)
        && admitted(&filters.producer_ids, &fact.producer_id)
        && admitted(&filters.business_unit_ids, &fact.business_unit_id)
        && admitted(&filters.location_types, &fact.location_type)
}

fn group_key(fact: &ImpactFact, group_by: GroupBy) -> Option<&String> {
    match group_by {
        GroupBy::Material => fact.material_id.as_ref(),
        GroupBy::Region => fact.origin_id.as_ref(),
        GroupBy::BusinessUnit => fact.business_unit_id.as_ref(),
        GroupBy::T1Supplier => fact.t1_supplier_id.as_ref(),
        GroupBy::Producer => fact.producer_id.as_ref(),
        GroupBy::LocationType => fact.location_type.as_ref(),
    }
}

impl InMemoryProvider {
    pub fn new(dataset: SourcingDataset) -> Self {
        let entity_index = dataset
            .entities
            .iter()
            .enumerate()
            .map(|(position, entity)| (entity.id.clone(), position))
            .collect();

        Self {
            dataset: Arc::new(dataset),
            entity_index,
        }
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        Ok(Self::new(SourcingDataset::load(dir)?))
    }

    pub fn dataset(&self) -> &SourcingDataset {
        &self.dataset
    }

    fn entity(&self, id: &str) -> Option<&EntityRecord> {
        self.entity_index
            .get(id)
            .and_then(|&position| self.dataset.entities.get(position))
    }

    fn entity_name(&self, group_by: GroupBy, id: &str) -> String {
        match group_by {
            GroupBy::LocationType => id.to_string(),
            _ => self
                .entity(id)
                .map_or_else(|| id.to_string(), |entity| entity.name.clone()),
        }
    }

    fn collect_records(
        &self,
        query: &ImpactDataQuery,
        scenarios: ScenarioScope<'_>,
    ) -> Vec<ImpactRecord> {
        let mut index: FxHashMap<(String, String, i32, Option<InterventionType>), usize> =
            FxHashMap::default();
        let mut records: Vec<ImpactRecord> = Vec::new();

        let facts = self.dataset.facts.iter().filter(|fact| {
            query.indicator_ids.contains(&fact.indicator_id)
                && fact.year >= query.start_year
                && fact.year <= query.end_year
                && scenarios.admits(fact)
                && matches_filters(fact, &query.filters)
        });

        for fact in facts {
            let Some(entity_id) = group_key(fact, query.group_by) else {
                continue;
            };
            let marker = fact.scenario.as_ref().map(|tag| tag.intervention_type);
            let key = (fact.indicator_id.clone(), entity_id.clone(), fact.year, marker);

            match index.get(&key) {
                Some(&position) => {
                    records[position].impact += fact.impact;
                    records[position].tonnes += fact.tonnes;
                }
                None => {
                    index.insert(key, records.len());
                    records.push(ImpactRecord {
                        indicator_id: fact.indicator_id.clone(),
                        entity_id: entity_id.clone(),
                        entity_name: self.entity_name(query.group_by, entity_id),
                        year: fact.year,
                        impact: fact.impact,
                        tonnes: fact.tonnes,
                        type_by_intervention: marker,
                    });
                }
            }
        }

        records
    }

    fn build_forest(&self, dimension: Dimension, matched: &FxHashSet<String>) -> Vec<EntityNode> {
        let mut included: FxHashSet<&str> = FxHashSet::default();
        for id in matched {
            let mut current = self.entity(id).filter(|entity| entity.dimension == dimension);
            while let Some(entity) = current {
                if !included.insert(entity.id.as_str()) {
                    break;
                }
                current = entity
                    .parent_id
                    .as_deref()
                    .and_then(|parent| self.entity(parent))
                    .filter(|parent| parent.dimension == dimension);
            }
        }

        let mut children_of: FxHashMap<Option<&str>, Vec<&EntityRecord>> = FxHashMap::default();
        for entity in &self.dataset.entities {
            if !included.contains(entity.id.as_str()) {
                continue;
            }
            let parent = entity
                .parent_id
                .as_deref()
                .filter(|parent| included.contains(parent));
            children_of.entry(parent).or_default().push(entity);
        }

        fn attach(
            parent: Option<&str>,
            children_of: &FxHashMap<Option<&str>, Vec<&EntityRecord>>,
        ) -> Vec<EntityNode> {
            let mut siblings: Vec<&EntityRecord> =
                children_of.get(&parent).cloned().unwrap_or_default();
            siblings.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            siblings
                .into_iter()
                .map(|entity| {
                    EntityNode::new(entity.id.clone(), entity.name.clone())
                        .with_children(attach(Some(entity.id.as_str()), children_of))
                })
                .collect()
        }

        attach(None, &children_of)
    }
}

impl EntityTreeProvider for InMemoryProvider {
    async fn get_tree(&self, group_by: GroupBy, filters: &EntityFilters) -> Result<Vec<EntityNode>> {
        let scenarios = match &filters.scenario_ids {
            Some(ids) => ScenarioScope::Scenarios(ids),
            None => ScenarioScope::ActualOnly,
        };

        let matched: FxHashSet<String> = self
            .dataset
            .facts
            .iter()
            .filter(|fact| scenarios.admits(fact) && matches_filters(fact, filters))
            .filter_map(|fact| group_key(fact, group_by).cloned())
            .collect();

        let forest = match group_by.dimension() {
            Some(dimension) => self.build_forest(dimension, &matched),
            None => {
                let mut location_types: Vec<String> = matched.into_iter().collect();
                location_types.sort();
                location_types
                    .into_iter()
                    .map(|location_type| EntityNode::new(location_type.clone(), location_type))
                    .collect()
            }
        };

        Ok(forest)
    }

    async fn get_descendant_ids(&self, dimension: Dimension, ids: &[String]) -> Result<Vec<String>> {
        let mut children_of: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        for entity in self.dataset.entities.iter().filter(|e| e.dimension == dimension) {
            if let Some(parent) = entity.parent_id.as_deref() {
                children_of.entry(parent).or_default().push(entity.id.as_str());
            }
        }

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut result: Vec<String> = Vec::new();
        let mut queue: VecDeque<&str> = ids.iter().map(String::as_str).collect();

        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            result.push(id.to_string());
            if let Some(children) = children_of.get(id) {
                queue.extend(children.iter().copied());
            }
        }

        Ok(result)
    }
}

impl ImpactDataProvider for InMemoryProvider {
    async fn get_impact_records(&self, query: &ImpactDataQuery) -> Result<Vec<ImpactRecord>> {
        Ok(self.collect_records(query, ScenarioScope::ActualOnly))
    }

    async fn get_scenario_impact_records(
        &self,
        query: &ImpactDataQuery,
        scenario_id: &str,
    ) -> Result<Vec<ImpactRecord>> {
        let scenario_ids = [scenario_id.to_string()];
        Ok(self.collect_records(query, ScenarioScope::Scenarios(&scenario_ids)))
    }
}

impl IndicatorProvider for InMemoryProvider {
    async fn get_indicators_by_id(&self, ids: &[String]) -> Result<Vec<Indicator>> {
        Ok(self
            .dataset
            .indicators
            .iter()
            .filter(|indicator| ids.contains(&indicator.id))
            .cloned()
            .collect())
    }
}
