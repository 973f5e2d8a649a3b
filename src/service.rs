//! Impact Table Service
//!
//! Orchestrates one table request end to end:
//!
//! 1. Validate the request and resolve its indicators
//! 2. Expand entity filters to their descendants
//! 3. Fetch the entity forest (paginated up front for comparison modes)
//! 4. Narrow the group-by filter to the forest being rendered
//! 5. Fetch flat rows and reconcile scenario rows
//! 6. Run the generic pipeline per indicator
//! 7. Sort, compute purchased tonnes, paginate or rank
//!
//! Everything after the fetches is synchronous and request-scoped.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::config::ImpactConfig;
use crate::error::{ImpactError, ImpactResult};
use crate::providers::{EntityTreeProvider, ImpactDataProvider, ImpactDataQuery, IndicatorProvider};
use crate::request::{
    GetActualVsScenarioImpactTableRequest, GetImpactTableRequest, GetRankedImpactTableRequest,
    GetScenarioVsScenarioImpactTableRequest, TableRequest, TableResponse, TableScope,
};
use crate::response::{
    ActualVsScenarioImpactTable, ImpactTable, PlainImpactTable, RankedImpactTable,
    ScenarioVsScenarioImpactTable,
};
use crate::table::{
    apply_ranking, build_indicator_tables, merge_scenario_into_actual, paginate_items,
    paginate_rows, reconcile_actual_vs_scenario, reconcile_scenario_vs_scenario,
    sort_indicator_tables, total_purchased_volume_by_year, ActualVsScenarioValues,
    FetchSpecification, Paginated, PaginationMeta, PlainValues, ScenarioVsScenarioValues,
    TableContext,
};
use crate::types::{
    ids_from_tree, Dimension, EntityFilters, EntityNode, GroupBy, ImpactRecord, Indicator,
    RankingSort,
};

pub struct ImpactTableService<P> {
    provider: Arc<P>,
    config: ImpactConfig,
}

impl<P> Clone for ImpactTableService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}

/// Replace the group-by filter with the ids of the rendered forest,
/// intersected with the caller's ids when present
fn narrow_filters(group_by: GroupBy, mut filters: EntityFilters, entities: &[EntityNode]) -> EntityFilters {
    let tree_ids = ids_from_tree(entities);

    let slot = match group_by {
        GroupBy::Material => &mut filters.material_ids,
        GroupBy::Region => &mut filters.origin_ids,
        GroupBy::BusinessUnit => &mut filters.business_unit_ids,
        GroupBy::T1Supplier => &mut filters.t1_supplier_ids,
        GroupBy::Producer => &mut filters.producer_ids,
        GroupBy::LocationType => &mut filters.location_types,
    };

    *slot = Some(match slot.take() {
        Some(requested) => {
            let requested: FxHashSet<String> = requested.into_iter().collect();
            tree_ids.into_iter().filter(|id| requested.contains(id)).collect()
        }
        None => tree_ids,
    });

    filters
}

fn data_query(scope: &TableScope, filters: EntityFilters) -> ImpactDataQuery {
    ImpactDataQuery {
        indicator_ids: scope.indicator_ids.clone(),
        start_year: scope.start_year,
        end_year: scope.end_year,
        group_by: scope.group_by,
        filters,
    }
}

impl<P> ImpactTableService<P>
where
    P: EntityTreeProvider + ImpactDataProvider + IndicatorProvider,
{
    pub fn new(provider: Arc<P>, config: ImpactConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve one request of any mode
    pub async fn build(&self, request: &TableRequest) -> ImpactResult<TableResponse> {
        match request {
            TableRequest::Plain { request, fetch } => self
                .get_impact_table(request, fetch)
                .await
                .map(TableResponse::Plain),
            TableRequest::Ranked { request } => self
                .get_ranked_impact_table(request)
                .await
                .map(TableResponse::Ranked),
            TableRequest::ActualVsScenario { request, fetch } => self
                .get_actual_vs_scenario_impact_table(request, fetch)
                .await
                .map(TableResponse::ActualVsScenario),
            TableRequest::ScenarioVsScenario { request, fetch } => self
                .get_scenario_vs_scenario_impact_table(request, fetch)
                .await
                .map(TableResponse::ScenarioVsScenario),
        }
    }

    // ========================================================================
    // Plain and ranked
    // ========================================================================

    pub async fn get_impact_table(
        &self,
        request: &GetImpactTableRequest,
        fetch: &FetchSpecification,
    ) -> ImpactResult<Paginated<PlainImpactTable>> {
        request.validate(&self.config)?;
        fetch.validate()?;
        info!(
            "Building impact table: {} indicators, {}..={}, grouped by {}",
            request.scope.indicator_ids.len(),
            request.scope.start_year,
            request.scope.end_year,
            request.scope.group_by.as_str()
        );

        let (mut table, _) = self
            .plain_table(&request.scope, request.scenario_id.as_deref())
            .await?;

        sort_indicator_tables(
            &mut table.impact_table,
            request.scope.sorting_year,
            request.scope.sorting_order,
        );
        let metadata = paginate_rows(&mut table.impact_table, fetch, &self.config)?;

        Ok(Paginated {
            data: table,
            metadata,
        })
    }

    pub async fn get_ranked_impact_table(
        &self,
        request: &GetRankedImpactTableRequest,
    ) -> ImpactResult<RankedImpactTable> {
        request.validate(&self.config)?;
        info!(
            "Building ranked impact table: top {} of {} indicators",
            request.max_ranking_entities,
            request.scope.indicator_ids.len()
        );

        let (table, range) = self
            .plain_table(&request.scope, request.scenario_id.as_deref())
            .await?;
        let sort: RankingSort = request.sort.unwrap_or_default();

        let impact_table = table
            .impact_table
            .into_iter()
            .map(|indicator_table| {
                apply_ranking(indicator_table, &range, request.max_ranking_entities, sort)
            })
            .collect();

        Ok(ImpactTable {
            impact_table,
            purchased_tonnes: table.purchased_tonnes,
        })
    }

    /// Unsorted, unpaginated plain table and its year range
    async fn plain_table(
        &self,
        scope: &TableScope,
        scenario_id: Option<&str>,
    ) -> ImpactResult<(PlainImpactTable, Vec<i32>)> {
        let indicators = self.resolve_indicators(&scope.indicator_ids).await?;

        let mut filters = self.expand_descendants(&scope.filters).await?;
        filters.scenario_ids = scenario_id.map(|id| vec![id.to_string()]);

        let entities = self.provider.get_tree(scope.group_by, &filters).await?;
        let query = data_query(scope, narrow_filters(scope.group_by, filters, &entities));

        let records: Vec<ImpactRecord> = if entities.is_empty() {
            Vec::new()
        } else {
            match scenario_id {
                Some(scenario_id) => merge_scenario_into_actual(
                    &self
                        .provider
                        .get_scenario_impact_records(&query, scenario_id)
                        .await?,
                ),
                None => self.provider.get_impact_records(&query).await?,
            }
        };
        debug!("Fetched {} rows over {} root entities", records.len(), entities.len());

        let range = scope.range_of_years();
        let context = TableContext {
            indicators: &indicators,
            entities: &entities,
            group_by: scope.group_by,
            range_of_years: &range,
            growth_rate: self.config.growth_rate,
        };
        let built = build_indicator_tables(&context, &records, PlainValues::from_record)?;
        debug!("Last year with data: {:?}", built.last_year_with_data);

        let purchased_tonnes = total_purchased_volume_by_year(
            &records,
            &range,
            self.config.growth_rate,
            scenario_id.is_some(),
        );

        Ok((
            ImpactTable {
                impact_table: built.tables,
                purchased_tonnes,
            },
            range,
        ))
    }

    // ========================================================================
    // Comparisons
    // ========================================================================

    pub async fn get_actual_vs_scenario_impact_table(
        &self,
        request: &GetActualVsScenarioImpactTableRequest,
        fetch: &FetchSpecification,
    ) -> ImpactResult<Paginated<ActualVsScenarioImpactTable>> {
        request.validate(&self.config)?;
        fetch.validate()?;
        let scope = &request.scope;
        info!(
            "Building actual vs scenario table: scenario {}, {} indicators",
            request.compared_scenario_id,
            scope.indicator_ids.len()
        );

        let indicators = self.resolve_indicators(&scope.indicator_ids).await?;
        let scenario_ids = vec![request.compared_scenario_id.clone()];
        let (entities, query, metadata) = self.paginated_scope(scope, scenario_ids, fetch).await?;

        let records = if entities.is_empty() {
            Vec::new()
        } else {
            self.provider
                .get_scenario_impact_records(&query, &request.compared_scenario_id)
                .await?
        };
        let reconciled = reconcile_actual_vs_scenario(&records);
        debug!("Reconciled {} rows into {}", records.len(), reconciled.len());

        let range = scope.range_of_years();
        let context = TableContext {
            indicators: &indicators,
            entities: &entities,
            group_by: scope.group_by,
            range_of_years: &range,
            growth_rate: self.config.growth_rate,
        };
        let mut tables =
            build_indicator_tables(&context, &reconciled, ActualVsScenarioValues::from_record)?.tables;
        sort_indicator_tables(&mut tables, scope.sorting_year, scope.sorting_order);

        let purchased_tonnes =
            total_purchased_volume_by_year(&reconciled, &range, self.config.growth_rate, false);

        Ok(Paginated {
            data: ImpactTable {
                impact_table: tables,
                purchased_tonnes,
            },
            metadata,
        })
    }

    pub async fn get_scenario_vs_scenario_impact_table(
        &self,
        request: &GetScenarioVsScenarioImpactTableRequest,
        fetch: &FetchSpecification,
    ) -> ImpactResult<Paginated<ScenarioVsScenarioImpactTable>> {
        request.validate(&self.config)?;
        fetch.validate()?;
        let scope = &request.scope;
        info!(
            "Building scenario vs scenario table: {} vs {}, {} indicators",
            request.base_scenario_id,
            request.compared_scenario_id,
            scope.indicator_ids.len()
        );

        let indicators = self.resolve_indicators(&scope.indicator_ids).await?;
        let scenario_ids = vec![
            request.base_scenario_id.clone(),
            request.compared_scenario_id.clone(),
        ];
        let (entities, query, metadata) = self.paginated_scope(scope, scenario_ids, fetch).await?;

        let (base, compared) = if entities.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            tokio::try_join!(
                self.provider
                    .get_scenario_impact_records(&query, &request.base_scenario_id),
                self.provider
                    .get_scenario_impact_records(&query, &request.compared_scenario_id),
            )?
        };
        let merged = reconcile_scenario_vs_scenario(&base, &compared);
        debug!(
            "Merged {} base and {} compared rows into {}",
            base.len(),
            compared.len(),
            merged.len()
        );

        let range = scope.range_of_years();
        let context = TableContext {
            indicators: &indicators,
            entities: &entities,
            group_by: scope.group_by,
            range_of_years: &range,
            growth_rate: self.config.growth_rate,
        };
        let mut tables =
            build_indicator_tables(&context, &merged, ScenarioVsScenarioValues::from_record)?.tables;
        sort_indicator_tables(&mut tables, scope.sorting_year, scope.sorting_order);

        let purchased_tonnes =
            total_purchased_volume_by_year(&merged, &range, self.config.growth_rate, false);

        Ok(Paginated {
            data: ImpactTable {
                impact_table: tables,
                purchased_tonnes,
            },
            metadata,
        })
    }

    /// Expanded filters, paginated root entities and the data query narrowed
    /// to them
    async fn paginated_scope(
        &self,
        scope: &TableScope,
        scenario_ids: Vec<String>,
        fetch: &FetchSpecification,
    ) -> ImpactResult<(Vec<EntityNode>, ImpactDataQuery, Option<PaginationMeta>)> {
        let mut filters = self.expand_descendants(&scope.filters).await?;
        filters.scenario_ids = Some(scenario_ids);

        let tree = self.provider.get_tree(scope.group_by, &filters).await?;
        let (entities, metadata) = paginate_items(tree, fetch, &self.config)?;
        let query = data_query(scope, narrow_filters(scope.group_by, filters, &entities));

        Ok((entities, query, metadata))
    }

    // ========================================================================
    // Shared steps
    // ========================================================================

    /// Indicators in request order; any id that does not resolve fails
    async fn resolve_indicators(&self, ids: &[String]) -> ImpactResult<Vec<Indicator>> {
        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        let found = self.provider.get_indicators_by_id(&unique).await?;

        unique
            .iter()
            .map(|id| {
                found
                    .iter()
                    .find(|indicator| &indicator.id == id)
                    .cloned()
                    .ok_or_else(|| ImpactError::IndicatorNotFound(id.clone()))
            })
            .collect()
    }

    async fn expand_descendants(&self, filters: &EntityFilters) -> ImpactResult<EntityFilters> {
        let mut expanded = filters.clone();

        expanded.material_ids = self
            .expand(Dimension::Material, &filters.material_ids)
            .await?;
        expanded.origin_ids = self
            .expand(Dimension::AdminRegion, &filters.origin_ids)
            .await?;
        expanded.business_unit_ids = self
            .expand(Dimension::BusinessUnit, &filters.business_unit_ids)
            .await?;
        expanded.t1_supplier_ids = self
            .expand(Dimension::Supplier, &filters.t1_supplier_ids)
            .await?;
        expanded.producer_ids = self
            .expand(Dimension::Supplier, &filters.producer_ids)
            .await?;

        Ok(expanded)
    }

    async fn expand(
        &self,
        dimension: Dimension,
        ids: &Option<Vec<String>>,
    ) -> ImpactResult<Option<Vec<String>>> {
        match ids {
            Some(ids) if !ids.is_empty() => Ok(Some(
                self.provider.get_descendant_ids(dimension, ids).await?,
            )),
            other => Ok(other.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_filters_defaults_to_tree_ids() {
        let entities = vec![EntityNode::new("R", "R").with_children(vec![EntityNode::new("C", "C")])];

        let filters = narrow_filters(GroupBy::Region, EntityFilters::default(), &entities);

        assert_eq!(filters.origin_ids, Some(vec!["C".to_string(), "R".to_string()]));
        assert_eq!(filters.material_ids, None);
    }

    #[test]
    fn test_narrow_filters_intersects_requested_ids() {
        let entities = vec![
            EntityNode::new("s1", "S1"),
            EntityNode::new("s2", "S2"),
        ];
        let filters = EntityFilters {
            t1_supplier_ids: Some(vec!["s2".to_string(), "s9".to_string()]),
            ..EntityFilters::default()
        };

        let narrowed = narrow_filters(GroupBy::T1Supplier, filters, &entities);

        assert_eq!(narrowed.t1_supplier_ids, Some(vec!["s2".to_string()]));
    }
}
