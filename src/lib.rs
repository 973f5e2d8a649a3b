//! Impact Table Engine
//!
//! Builds nested, year-indexed impact tables for supply-chain sustainability
//! analytics: flat (indicator, entity, year) impact rows are projected over a
//! requested year range and aggregated up an entity hierarchy.
//!
//! Layout:
//! - `table/`: pure request-scoped pipeline (reconcile, index, project,
//!   aggregate, sort, paginate, rank)
//! - `service`: per-mode orchestration over the provider traits
//! - `data` / `memory_provider`: CSV dataset loaded with Polars and served
//!   from memory
//! - `api_server` (feature `api`): Axum endpoints

pub mod config;
pub mod data;
pub mod error;
pub mod memory_provider;
pub mod providers;
pub mod request;
pub mod response;
pub mod service;
pub mod table;
pub mod types;
pub mod utils;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use config::ImpactConfig;
pub use data::SourcingDataset;
pub use error::{ImpactError, ImpactResult};
pub use memory_provider::InMemoryProvider;
pub use providers::{EntityTreeProvider, ImpactDataProvider, ImpactDataQuery, IndicatorProvider};
pub use request::{
    GetActualVsScenarioImpactTableRequest, GetImpactTableRequest, GetRankedImpactTableRequest,
    GetScenarioVsScenarioImpactTableRequest, TableRequest, TableResponse, TableScope,
};
pub use response::{ImpactTable, IndicatorTable, TableRow};
pub use service::ImpactTableService;
pub use table::{FetchSpecification, Paginated, PaginationMeta};
pub use types::{EntityFilters, EntityNode, GroupBy, ImpactRecord, Indicator, SortingOrder};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
