//! Response shapes shared by every table mode

use serde::{Deserialize, Serialize};

use crate::table::ranking::RankedIndicatorTable;
use crate::table::tonnes::PurchasedTonnes;
use crate::table::values::{ActualVsScenarioValues, PlainValues, ScenarioVsScenarioValues};
use crate::types::GroupBy;

/// Entity tree node carrying one value per requested year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow<V> {
    pub id: String,
    pub name: String,
    pub children: Vec<TableRow<V>>,
    pub values: Vec<V>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorMetadata {
    pub unit: String,
}

/// Rows and per-year totals for one indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorTable<V> {
    pub indicator_id: String,
    pub indicator_short_name: String,
    pub group_by: GroupBy,
    pub rows: Vec<TableRow<V>>,
    /// Sum over root rows only
    pub year_sum: Vec<V>,
    pub metadata: IndicatorMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactTable<T> {
    pub impact_table: Vec<T>,
    pub purchased_tonnes: Vec<PurchasedTonnes>,
}

pub type PlainImpactTable = ImpactTable<IndicatorTable<PlainValues>>;
pub type RankedImpactTable = ImpactTable<RankedIndicatorTable>;
pub type ActualVsScenarioImpactTable = ImpactTable<IndicatorTable<ActualVsScenarioValues>>;
pub type ScenarioVsScenarioImpactTable = ImpactTable<IndicatorTable<ScenarioVsScenarioValues>>;
