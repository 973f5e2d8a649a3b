// Axum API server for impact tables
//
// Serves the four table modes over GET endpoints backed by the in-memory
// sourcing dataset. Successful responses are cached per path + query.

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ImpactConfig;
use crate::error::{ImpactError, ImpactResult};
use crate::memory_provider::InMemoryProvider;
use crate::request::{
    GetActualVsScenarioImpactTableRequest, GetImpactTableRequest, GetRankedImpactTableRequest,
    GetScenarioVsScenarioImpactTableRequest, TableScope,
};
use crate::service::ImpactTableService;
use crate::table::FetchSpecification;
use crate::types::{EntityFilters, GroupBy, RankingSort, SortingOrder};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub service: ImpactTableService<InMemoryProvider>,
    pub cache: Cache<String, serde_json::Value>,
}

impl AppState {
    /// Load the sourcing dataset from `data_dir` and build the service
    pub fn new(data_dir: &str, config: ImpactConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading sourcing dataset...");
        let provider = InMemoryProvider::from_dir(Path::new(data_dir))?;
        Ok(Self::with_provider(provider, config))
    }

    pub fn with_provider(provider: InMemoryProvider, config: ImpactConfig) -> Self {
        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            service: ImpactTableService::new(Arc::new(provider), config),
            cache,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/impact/table", get(get_impact_table))
        .route("/api/impact/ranking", get(get_ranked_impact_table))
        .route(
            "/api/impact/compare/scenario-vs-actual",
            get(get_actual_vs_scenario_impact_table),
        )
        .route(
            "/api/impact/compare/scenario-vs-scenario",
            get(get_scenario_vs_scenario_impact_table),
        )
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Flat query string shared by every table endpoint; list values are
/// comma-separated
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactTableParams {
    pub indicator_ids: String,
    pub start_year: i32,
    pub end_year: i32,
    pub group_by: Option<GroupBy>,
    pub material_ids: Option<String>,
    pub origin_ids: Option<String>,
    pub t1_supplier_ids: Option<String>,
    pub producer_ids: Option<String>,
    pub business_unit_ids: Option<String>,
    pub location_types: Option<String>,
    pub sorting_year: Option<i32>,
    pub sorting_order: Option<SortingOrder>,
    pub scenario_id: Option<String>,
    pub base_scenario_id: Option<String>,
    pub compared_scenario_id: Option<String>,
    pub max_ranking_entities: Option<usize>,
    pub sort: Option<RankingSort>,
    pub page_size: Option<usize>,
    pub page_number: Option<usize>,
    pub disable_pagination: Option<bool>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl ImpactTableParams {
    fn scope(&self) -> Result<TableScope, AppError> {
        let group_by = self
            .group_by
            .ok_or_else(|| AppError::BadRequest("groupBy is required".to_string()))?;

        Ok(TableScope {
            indicator_ids: split_list(&self.indicator_ids),
            start_year: self.start_year,
            end_year: self.end_year,
            group_by,
            filters: EntityFilters {
                material_ids: self.material_ids.as_deref().map(split_list),
                origin_ids: self.origin_ids.as_deref().map(split_list),
                t1_supplier_ids: self.t1_supplier_ids.as_deref().map(split_list),
                producer_ids: self.producer_ids.as_deref().map(split_list),
                business_unit_ids: self.business_unit_ids.as_deref().map(split_list),
                location_types: self.location_types.as_deref().map(split_list),
                scenario_ids: None,
            },
            sorting_year: self.sorting_year,
            sorting_order: self.sorting_order,
        })
    }

    fn fetch(&self) -> FetchSpecification {
        FetchSpecification {
            disable_pagination: self.disable_pagination.unwrap_or(false),
            page_size: self.page_size,
            page_number: self.page_number,
        }
    }
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Serve from cache, or build, serialize and cache the response
async fn cached<T, Fut>(state: &AppState, uri: &Uri, build: Fut) -> Result<Json<serde_json::Value>, AppError>
where
    T: Serialize,
    Fut: Future<Output = ImpactResult<T>>,
{
    let cache_key = uri.to_string();

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for {}", cache_key);
        return Ok(Json(cached));
    }

    let response = build.await?;
    let result = serde_json::to_value(&response).map_err(|e| AppError::Internal(e.to_string()))?;

    state.cache.insert(cache_key, result.clone()).await;

    Ok(Json(result))
}

async fn get_impact_table(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<ImpactTableParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = GetImpactTableRequest {
        scope: params.scope()?,
        scenario_id: params.scenario_id.clone(),
    };
    let fetch = params.fetch();

    cached(&state, &uri, state.service.get_impact_table(&request, &fetch)).await
}

async fn get_ranked_impact_table(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<ImpactTableParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let max_ranking_entities = params
        .max_ranking_entities
        .ok_or_else(|| AppError::BadRequest("maxRankingEntities is required".to_string()))?;
    let request = GetRankedImpactTableRequest {
        scope: params.scope()?,
        scenario_id: params.scenario_id.clone(),
        max_ranking_entities,
        sort: params.sort,
    };

    cached(&state, &uri, state.service.get_ranked_impact_table(&request)).await
}

async fn get_actual_vs_scenario_impact_table(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<ImpactTableParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = GetActualVsScenarioImpactTableRequest {
        scope: params.scope()?,
        compared_scenario_id: params.compared_scenario_id.clone().unwrap_or_default(),
    };
    let fetch = params.fetch();

    cached(
        &state,
        &uri,
        state.service.get_actual_vs_scenario_impact_table(&request, &fetch),
    )
    .await
}

async fn get_scenario_vs_scenario_impact_table(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<ImpactTableParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = GetScenarioVsScenarioImpactTableRequest {
        scope: params.scope()?,
        base_scenario_id: params.base_scenario_id.clone().unwrap_or_default(),
        compared_scenario_id: params.compared_scenario_id.clone().unwrap_or_default(),
    };
    let fetch = params.fetch();

    cached(
        &state,
        &uri,
        state.service.get_scenario_vs_scenario_impact_table(&request, &fetch),
    )
    .await
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<ImpactError> for AppError {
    fn from(error: ImpactError) -> Self {
        match error {
            ImpactError::InvalidRequest(_) => AppError::BadRequest(error.to_string()),
            other => {
                tracing::error!("Impact table failed: {}", other);
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
