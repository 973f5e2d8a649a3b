//! External collaborators of the table service
//!
//! The service owns no storage: entity forests, flat impact rows and indicator
//! metadata come from these providers. Their errors pass through unchanged.

use std::future::Future;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::types::{Dimension, EntityFilters, EntityNode, GroupBy, ImpactRecord, Indicator};

/// Scope of one flat-data fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactDataQuery {
    pub indicator_ids: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub group_by: GroupBy,
    pub filters: EntityFilters,
}

pub trait EntityTreeProvider: Send + Sync {
    /// Forest for `group_by`, restricted to entities with sourcing data
    /// matching `filters`
    fn get_tree(
        &self,
        group_by: GroupBy,
        filters: &EntityFilters,
    ) -> impl Future<Output = Result<Vec<EntityNode>>> + Send;

    /// `ids` plus all of their descendants in `dimension`
    fn get_descendant_ids(
        &self,
        dimension: Dimension,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

pub trait ImpactDataProvider: Send + Sync {
    /// Actual rows only (no intervention marker)
    fn get_impact_records(
        &self,
        query: &ImpactDataQuery,
    ) -> impl Future<Output = Result<Vec<ImpactRecord>>> + Send;

    /// Actual rows plus the rows of `scenario_id`, the latter tagged with
    /// their intervention marker
    fn get_scenario_impact_records(
        &self,
        query: &ImpactDataQuery,
        scenario_id: &str,
    ) -> impl Future<Output = Result<Vec<ImpactRecord>>> + Send;
}

pub trait IndicatorProvider: Send + Sync {
    /// Indicators for the ids that exist; unknown ids are simply absent
    fn get_indicators_by_id(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<Indicator>>> + Send;
}
