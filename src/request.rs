//! Table requests and tagged mode dispatch
//!
//! Every request shares a `TableScope` (indicators, year range, grouping,
//! entity filters, optional sorting), flattened next to the mode-specific
//! fields so the wire shape stays one flat object.

use serde::{Deserialize, Serialize};

use crate::config::ImpactConfig;
use crate::error::{ImpactError, ImpactResult};
use crate::response::{
    ActualVsScenarioImpactTable, PlainImpactTable, RankedImpactTable,
    ScenarioVsScenarioImpactTable,
};
use crate::table::pagination::{FetchSpecification, Paginated};
use crate::types::{EntityFilters, GroupBy, RankingSort, SortingOrder};
use crate::utils::range_of_years;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableScope {
    pub indicator_ids: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub group_by: GroupBy,
    #[serde(flatten)]
    pub filters: EntityFilters,
    #[serde(default)]
    pub sorting_year: Option<i32>,
    #[serde(default)]
    pub sorting_order: Option<SortingOrder>,
}

impl TableScope {
    pub fn new(indicator_ids: Vec<String>, start_year: i32, end_year: i32, group_by: GroupBy) -> Self {
        Self {
            indicator_ids,
            start_year,
            end_year,
            group_by,
            filters: EntityFilters::default(),
            sorting_year: None,
            sorting_order: None,
        }
    }

    pub fn validate(&self, config: &ImpactConfig) -> ImpactResult<()> {
        if self.indicator_ids.is_empty() {
            return Err(ImpactError::invalid("indicatorIds must not be empty"));
        }
        if self.start_year > self.end_year {
            return Err(ImpactError::invalid(format!(
                "startYear ({}) must not be after endYear ({})",
                self.start_year, self.end_year
            )));
        }
        let span = i64::from(self.end_year) - i64::from(self.start_year) + 1;
        if span > config.max_year_span as i64 {
            return Err(ImpactError::invalid(format!(
                "startYear..endYear spans {} years, at most {} allowed",
                span, config.max_year_span
            )));
        }
        if let Some(year) = self.sorting_year {
            if year < self.start_year || year > self.end_year {
                return Err(ImpactError::invalid(format!(
                    "sortingYear ({}) must be within {}..={}",
                    year, self.start_year, self.end_year
                )));
            }
        }
        Ok(())
    }

    pub fn range_of_years(&self) -> Vec<i32> {
        range_of_years(self.start_year, self.end_year)
    }
}

fn require_scenario_id(field: &str, value: &str) -> ImpactResult<()> {
    if value.trim().is_empty() {
        return Err(ImpactError::invalid(format!("{} is required", field)));
    }
    Ok(())
}

/// Plain impact table, optionally overlaid with one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetImpactTableRequest {
    #[serde(flatten)]
    pub scope: TableScope,
    #[serde(default)]
    pub scenario_id: Option<String>,
}

impl GetImpactTableRequest {
    pub fn validate(&self, config: &ImpactConfig) -> ImpactResult<()> {
        self.scope.validate(config)
    }
}

/// Plain table capped to the top `maxRankingEntities` root rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRankedImpactTableRequest {
    #[serde(flatten)]
    pub scope: TableScope,
    #[serde(default)]
    pub scenario_id: Option<String>,
    pub max_ranking_entities: usize,
    #[serde(default)]
    pub sort: Option<RankingSort>,
}

impl GetRankedImpactTableRequest {
    pub fn validate(&self, config: &ImpactConfig) -> ImpactResult<()> {
        self.scope.validate(config)?;
        if self.max_ranking_entities == 0 {
            return Err(ImpactError::invalid("maxRankingEntities must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetActualVsScenarioImpactTableRequest {
    #[serde(flatten)]
    pub scope: TableScope,
    pub compared_scenario_id: String,
}

impl GetActualVsScenarioImpactTableRequest {
    pub fn validate(&self, config: &ImpactConfig) -> ImpactResult<()> {
        self.scope.validate(config)?;
        require_scenario_id("comparedScenarioId", &self.compared_scenario_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetScenarioVsScenarioImpactTableRequest {
    #[serde(flatten)]
    pub scope: TableScope,
    pub base_scenario_id: String,
    pub compared_scenario_id: String,
}

impl GetScenarioVsScenarioImpactTableRequest {
    pub fn validate(&self, config: &ImpactConfig) -> ImpactResult<()> {
        self.scope.validate(config)?;
        require_scenario_id("baseScenarioId", &self.base_scenario_id)?;
        require_scenario_id("comparedScenarioId", &self.compared_scenario_id)
    }
}

/// Table request tagged with its mode, resolved once by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum TableRequest {
    Plain {
        request: GetImpactTableRequest,
        #[serde(default)]
        fetch: FetchSpecification,
    },
    Ranked {
        request: GetRankedImpactTableRequest,
    },
    ActualVsScenario {
        request: GetActualVsScenarioImpactTableRequest,
        #[serde(default)]
        fetch: FetchSpecification,
    },
    ScenarioVsScenario {
        request: GetScenarioVsScenarioImpactTableRequest,
        #[serde(default)]
        fetch: FetchSpecification,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableResponse {
    Plain(Paginated<PlainImpactTable>),
    Ranked(RankedImpactTable),
    ActualVsScenario(Paginated<ActualVsScenarioImpactTable>),
    ScenarioVsScenario(Paginated<ScenarioVsScenarioImpactTable>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> TableScope {
        TableScope::new(vec!["ind1".to_string()], 2020, 2022, GroupBy::Material)
    }

    #[test]
    fn test_valid_scope() {
        assert!(scope().validate(&ImpactConfig::default()).is_ok());
        assert_eq!(scope().range_of_years(), vec![2020, 2021, 2022]);
    }

    #[test]
    fn test_rejects_inverted_years() {
        let mut scope = scope();
        scope.start_year = 2023;
        assert!(matches!(
            scope.validate(&ImpactConfig::default()),
            Err(ImpactError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_rejects_unbounded_year_span() {
        let scope = TableScope::new(vec!["ind1".to_string()], 0, i32::MAX, GroupBy::Material);
        assert!(matches!(
            scope.validate(&ImpactConfig::default()),
            Err(ImpactError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_year_span_limit_is_inclusive() {
        let config = ImpactConfig {
            max_year_span: 3,
            ..ImpactConfig::default()
        };
        assert!(scope().validate(&config).is_ok());

        let mut wider = scope();
        wider.end_year = 2023;
        assert!(wider.validate(&config).is_err());
    }

    #[test]
    fn test_rejects_sorting_year_out_of_range() {
        let mut scope = scope();
        scope.sorting_year = Some(2030);
        assert!(scope.validate(&ImpactConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_empty_indicators() {
        let mut scope = scope();
        scope.indicator_ids.clear();
        assert!(scope.validate(&ImpactConfig::default()).is_err());
    }

    #[test]
    fn test_ranked_requires_positive_limit() {
        let request = GetRankedImpactTableRequest {
            scope: scope(),
            scenario_id: None,
            max_ranking_entities: 0,
            sort: None,
        };
        assert!(request.validate(&ImpactConfig::default()).is_err());
    }

    #[test]
    fn test_comparison_requires_scenario_ids() {
        let request = GetScenarioVsScenarioImpactTableRequest {
            scope: scope(),
            base_scenario_id: "s1".to_string(),
            compared_scenario_id: " ".to_string(),
        };
        assert!(request.validate(&ImpactConfig::default()).is_err());
    }

    #[test]
    fn test_tagged_request_from_json() {
        let json = serde_json::json!({
            "mode": "actualVsScenario",
            "request": {
                "indicatorIds": ["ind1"],
                "startYear": 2020,
                "endYear": 2021,
                "groupBy": "region",
                "materialIds": ["m1"],
                "comparedScenarioId": "s1"
            }
        });

        let request: TableRequest = serde_json::from_value(json).unwrap();

        match request {
            TableRequest::ActualVsScenario { request, fetch } => {
                assert_eq!(request.compared_scenario_id, "s1");
                assert_eq!(request.scope.group_by, GroupBy::Region);
                assert_eq!(
                    request.scope.filters.material_ids,
                    Some(vec!["m1".to_string()])
                );
                assert_eq!(fetch, FetchSpecification::default());
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }
}
