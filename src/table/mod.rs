//! Impact table pipeline
//!
//! Pure, request-scoped stages composed by `ImpactTableService`:
//! - `reconcile`: fold scenario rows into actual rows by composite key
//! - `aux_index` / `projection`: per-entity year series with gaps filled
//! - `aggregate`: post-order sums over the entity forest
//! - `sorting` / `pagination` / `ranking`: post-processing of root rows
//! - `tonnes`: purchased volume series

pub mod aggregate;
pub mod aux_index;
pub mod builder;
pub mod pagination;
pub mod projection;
pub mod ranking;
pub mod reconcile;
pub mod sorting;
pub mod tonnes;
pub mod values;

pub use aggregate::{aggregate_forest, aggregate_tree, sum_root_rows, EntitySeries};
pub use aux_index::{build_aux_index, AuxIndexMap, YearSeries};
pub use builder::{build_indicator_tables, BuiltTables, TableContext};
pub use pagination::{paginate_items, paginate_rows, FetchSpecification, Paginated, PaginationMeta};
pub use projection::fill_year_gaps;
pub use ranking::{apply_ranking, AggregatedValue, RankedIndicatorTable, RankingOthers};
pub use reconcile::{
    merge_scenario_into_actual, reconcile_actual_vs_scenario, reconcile_scenario_vs_scenario,
};
pub use sorting::{sort_indicator_tables, sort_rows_recursively};
pub use tonnes::{total_purchased_volume_by_year, PurchasedTonnes};
pub use values::{ActualVsScenarioValues, PlainValues, ScenarioVsScenarioValues, TableValues};
