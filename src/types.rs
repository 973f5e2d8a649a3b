//! Domain types shared by the providers and the table builders
//!
//! - `EntityNode`: grouping-dimension forest supplied by the entity tree provider
//! - `ImpactRecord`: flat (indicator, entity, year) impact rows
//! - `ActualVsScenarioRecord` / `ScenarioVsScenarioRecord`: reconciled comparison rows

use serde::{Deserialize, Serialize};

/// Node of the grouping-dimension forest (material, region, supplier, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<EntityNode>,
}

impl EntityNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<EntityNode>) -> Self {
        self.children = children;
        self
    }
}

/// Collect every id of a forest, descendants before their parent
pub fn ids_from_tree(entities: &[EntityNode]) -> Vec<String> {
    let mut ids = Vec::new();
    for entity in entities {
        ids.extend(ids_from_tree(&entity.children));
        ids.push(entity.id.clone());
    }
    ids
}

/// Dimension the impact table rows are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupBy {
    #[serde(rename = "material")]
    Material,
    #[serde(rename = "business-unit")]
    BusinessUnit,
    #[serde(rename = "region")]
    Region,
    #[serde(rename = "t1Supplier")]
    T1Supplier,
    #[serde(rename = "producer")]
    Producer,
    #[serde(rename = "location-type")]
    LocationType,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Material => "material",
            GroupBy::BusinessUnit => "business-unit",
            GroupBy::Region => "region",
            GroupBy::T1Supplier => "t1Supplier",
            GroupBy::Producer => "producer",
            GroupBy::LocationType => "location-type",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "material" => Some(GroupBy::Material),
            "business-unit" => Some(GroupBy::BusinessUnit),
            "region" => Some(GroupBy::Region),
            "t1Supplier" => Some(GroupBy::T1Supplier),
            "producer" => Some(GroupBy::Producer),
            "location-type" => Some(GroupBy::LocationType),
            _ => None,
        }
    }

    /// Hierarchy backing this grouping; location types are flat and have none
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            GroupBy::Material => Some(Dimension::Material),
            GroupBy::BusinessUnit => Some(Dimension::BusinessUnit),
            GroupBy::Region => Some(Dimension::AdminRegion),
            GroupBy::T1Supplier | GroupBy::Producer => Some(Dimension::Supplier),
            GroupBy::LocationType => None,
        }
    }
}

/// Entity hierarchies known to the tree provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Material,
    AdminRegion,
    BusinessUnit,
    Supplier,
}

impl Dimension {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "material" => Some(Dimension::Material),
            "admin-region" | "region" => Some(Dimension::AdminRegion),
            "business-unit" => Some(Dimension::BusinessUnit),
            "supplier" => Some(Dimension::Supplier),
            _ => None,
        }
    }
}

/// Marker carried by rows that come from a scenario intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterventionType {
    Canceled,
    Replacing,
}

impl InterventionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "CANCELED" | "CANCELLED" => Some(InterventionType::Canceled),
            "REPLACING" => Some(InterventionType::Replacing),
            _ => None,
        }
    }
}

/// Entity filters forwarded to the tree and data providers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1_supplier_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_ids: Option<Vec<String>>,
}

/// Indicator metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub id: String,
    pub short_name: String,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortingOrder {
    Asc,
    #[default]
    Desc,
}

/// Order of a ranked table; `DES` is the original wire spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankingSort {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DES")]
    Des,
}

// ============================================================================
// Flat rows
// ============================================================================

/// One row per indicator × entity × year (× intervention marker) as returned
/// by the flat data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    pub indicator_id: String,
    pub entity_id: String,
    pub entity_name: String,
    pub year: i32,
    pub impact: f64,
    #[serde(default)]
    pub tonnes: f64,
    #[serde(default)]
    pub type_by_intervention: Option<InterventionType>,
}

/// Actual row carrying the value the compared scenario would produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualVsScenarioRecord {
    pub indicator_id: String,
    pub entity_id: String,
    pub entity_name: String,
    pub year: i32,
    pub impact: f64,
    pub scenario_impact: f64,
    pub tonnes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioVsScenarioRecord {
    pub indicator_id: String,
    pub entity_id: String,
    pub entity_name: String,
    pub year: i32,
    pub base_scenario_impact: f64,
    pub compared_scenario_impact: f64,
    pub tonnes: f64,
}

/// Composite key used for reconciliation and indexing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub indicator_id: String,
    pub entity_id: String,
    pub year: i32,
}

/// Accessors the index builder and tonnage series need from any flat row
pub trait TableRecord {
    fn indicator_id(&self) -> &str;
    fn entity_id(&self) -> &str;
    fn year(&self) -> i32;
    fn tonnes(&self) -> f64;

    fn key(&self) -> RecordKey {
        RecordKey {
            indicator_id: self.indicator_id().to_string(),
            entity_id: self.entity_id().to_string(),
            year: self.year(),
        }
    }
}

macro_rules! impl_table_record {
    ($($ty:ty),*) => {
        $(
            impl TableRecord for $ty {
                fn indicator_id(&self) -> &str {
                    &self.indicator_id
                }
                fn entity_id(&self) -> &str {
                    &self.entity_id
                }
                fn year(&self) -> i32 {
                    self.year
                }
                fn tonnes(&self) -> f64 {
                    self.tonnes
                }
            }
        )*
    };
}

impl_table_record!(ImpactRecord, ActualVsScenarioRecord, ScenarioVsScenarioRecord);
