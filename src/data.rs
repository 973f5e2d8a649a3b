//! Sourcing Dataset Loading
//!
//! Loads the reference dataset served by `InMemoryProvider` from three CSV
//! files using Polars:
//! - `entities.csv`: `id,name,parent_id,dimension`
//! - `indicators.csv`: `id,short_name,unit`
//! - `impact_facts.csv`: one row per sourcing location × indicator × year,
//!   `indicator_id,year,impact,tonnes,material_id,origin_id,t1_supplier_id,
//!   producer_id,business_unit_id,location_type,scenario_id,intervention_type`
//!
//! Facts without a `scenario_id` are actual data. Scenario facts must carry
//! an intervention type.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use polars::prelude::*;
use tracing::info;

use crate::types::{Dimension, Indicator, InterventionType};

/// Node of one entity hierarchy, linked to its parent by id
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub dimension: Dimension,
}

/// Scenario a fact belongs to, and how it changes actual sourcing
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTag {
    pub scenario_id: String,
    pub intervention_type: InterventionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImpactFact {
    pub indicator_id: String,
    pub year: i32,
    pub impact: f64,
    pub tonnes: f64,
    pub material_id: Option<String>,
    pub origin_id: Option<String>,
    pub t1_supplier_id: Option<String>,
    pub producer_id: Option<String>,
    pub business_unit_id: Option<String>,
    pub location_type: Option<String>,
    /// `None` for actual data
    pub scenario: Option<ScenarioTag>,
}

impl ImpactFact {
    /// Actual fact with no dimension links set
    pub fn actual(indicator_id: impl Into<String>, year: i32, impact: f64, tonnes: f64) -> Self {
        Self {
            indicator_id: indicator_id.into(),
            year,
            impact,
            tonnes,
            material_id: None,
            origin_id: None,
            t1_supplier_id: None,
            producer_id: None,
            business_unit_id: None,
            location_type: None,
            scenario: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourcingDataset {
    pub entities: Vec<EntityRecord>,
    pub indicators: Vec<Indicator>,
    pub facts: Vec<ImpactFact>,
}

impl SourcingDataset {
    pub fn new(entities: Vec<EntityRecord>, indicators: Vec<Indicator>, facts: Vec<ImpactFact>) -> Self {
        Self {
            entities,
            indicators,
            facts,
        }
    }

    /// Load all three files from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        info!("Loading sourcing dataset from {:?}", dir);

        let entities = Self::load_entities(&dir.join("entities.csv"))?;
        let indicators = Self::load_indicators(&dir.join("indicators.csv"))?;
        let facts = Self::load_facts(&dir.join("impact_facts.csv"))?;

        info!("  Entities: {}", entities.len());
        info!("  Indicators: {}", indicators.len());
        info!("  Impact facts: {}", facts.len());

        Ok(Self::new(entities, indicators, facts))
    }

    fn load_entities(path: &Path) -> Result<Vec<EntityRecord>> {
        let df = read_csv(path)?;
        let ids = string_column(&df, "id")?;
        let names = string_column(&df, "name")?;
        let parents = string_column(&df, "parent_id")?;
        let dimensions = string_column(&df, "dimension")?;

        let mut entities = Vec::with_capacity(df.height());
        for (row, (((id, name), parent_id), dimension)) in ids
            .into_iter()
            .zip(names)
            .zip(parents)
            .zip(dimensions)
            .enumerate()
        {
            let id = id.ok_or_else(|| anyhow!("{:?} row {}: missing id", path, row))?;
            let raw_dimension =
                dimension.ok_or_else(|| anyhow!("{:?} row {}: missing dimension", path, row))?;
            let dimension = Dimension::parse(&raw_dimension).ok_or_else(|| {
                anyhow!("{:?} row {}: unknown dimension '{}'", path, row, raw_dimension)
            })?;

            entities.push(EntityRecord {
                name: name.unwrap_or_else(|| id.clone()),
                id,
                parent_id,
                dimension,
            });
        }

        Ok(entities)
    }

    fn load_indicators(path: &Path) -> Result<Vec<Indicator>> {
        let df = read_csv(path)?;
        let ids = string_column(&df, "id")?;
        let short_names = string_column(&df, "short_name")?;
        let units = string_column(&df, "unit")?;

        let mut indicators = Vec::with_capacity(df.height());
        for (row, ((id, short_name), unit)) in ids.into_iter().zip(short_names).zip(units).enumerate() {
            let id = id.ok_or_else(|| anyhow!("{:?} row {}: missing id", path, row))?;
            indicators.push(Indicator {
                short_name: short_name.unwrap_or_else(|| id.clone()),
                id,
                unit: unit.unwrap_or_default(),
            });
        }

        Ok(indicators)
    }

    fn load_facts(path: &Path) -> Result<Vec<ImpactFact>> {
        let df = read_csv(path)?;
        let indicator_ids = string_column(&df, "indicator_id")?;
        let years = i32_column(&df, "year")?;
        let impacts = f64_column(&df, "impact")?;
        let tonnes = f64_column(&df, "tonnes")?;
        let mut material_ids = string_column(&df, "material_id")?.into_iter();
        let mut origin_ids = string_column(&df, "origin_id")?.into_iter();
        let mut t1_supplier_ids = string_column(&df, "t1_supplier_id")?.into_iter();
        let mut producer_ids = string_column(&df, "producer_id")?.into_iter();
        let mut business_unit_ids = string_column(&df, "business_unit_id")?.into_iter();
        let mut location_types = string_column(&df, "location_type")?.into_iter();
        let mut scenario_ids = string_column(&df, "scenario_id")?.into_iter();
        let mut intervention_types = string_column(&df, "intervention_type")?.into_iter();

        let mut facts = Vec::with_capacity(df.height());
        for (row, ((indicator_id, year), (impact, tonnes))) in indicator_ids
            .into_iter()
            .zip(years)
            .zip(impacts.into_iter().zip(tonnes))
            .enumerate()
        {
            let indicator_id =
                indicator_id.ok_or_else(|| anyhow!("{:?} row {}: missing indicator_id", path, row))?;
            let year = year.ok_or_else(|| anyhow!("{:?} row {}: missing year", path, row))?;

            let scenario = match (
                scenario_ids.next().flatten(),
                intervention_types.next().flatten(),
            ) {
                (None, None) => None,
                (Some(scenario_id), Some(raw)) => {
                    let intervention_type = InterventionType::parse(&raw).ok_or_else(|| {
                        anyhow!("{:?} row {}: unknown intervention_type '{}'", path, row, raw)
                    })?;
                    Some(ScenarioTag {
                        scenario_id,
                        intervention_type,
                    })
                }
                (Some(_), None) => {
                    bail!("{:?} row {}: scenario fact without intervention_type", path, row)
                }
                (None, Some(_)) => {
                    bail!("{:?} row {}: intervention_type without scenario_id", path, row)
                }
            };

            facts.push(ImpactFact {
                indicator_id,
                year,
                impact: impact.unwrap_or(0.0),
                tonnes: tonnes.unwrap_or(0.0),
                material_id: material_ids.next().flatten(),
                origin_id: origin_ids.next().flatten(),
                t1_supplier_id: t1_supplier_ids.next().flatten(),
                producer_id: producer_ids.next().flatten(),
                business_unit_id: business_unit_ids.next().flatten(),
                location_type: location_types.next().flatten(),
                scenario,
            });
        }

        Ok(facts)
    }
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))
}

/// String cells with blanks mapped to `None`
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as string", name))?;

    let values = column
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))?
        .into_iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .collect();

    Ok(values)
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;

    Ok(column
        .f64()
        .with_context(|| format!("Column '{}' is not f64", name))?
        .into_iter()
        .collect())
}

fn i32_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::Int32)
        .with_context(|| format!("Column '{}' is not an integer", name))?;

    Ok(column
        .i32()
        .with_context(|| format!("Column '{}' is not i32", name))?
        .into_iter()
        .collect())
}
