//! Pagination
//!
//! Comparison tables paginate the root entities before aggregation; plain
//! tables slice the aggregated root rows afterwards. Both report the same
//! metadata block, omitted when pagination is disabled.

use serde::{Deserialize, Serialize};

use crate::config::ImpactConfig;
use crate::error::{ImpactError, ImpactResult};
use crate::response::IndicatorTable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSpecification {
    #[serde(default)]
    pub disable_pagination: bool,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub page_number: Option<usize>,
}

impl FetchSpecification {
    pub fn unpaginated() -> Self {
        Self {
            disable_pagination: true,
            ..Self::default()
        }
    }

    pub fn page(page_size: usize, page_number: usize) -> Self {
        Self {
            disable_pagination: false,
            page_size: Some(page_size),
            page_number: Some(page_number),
        }
    }

    pub fn validate(&self) -> ImpactResult<()> {
        if self.page_size == Some(0) {
            return Err(ImpactError::invalid("pageSize must be at least 1"));
        }
        if self.page_number == Some(0) {
            return Err(ImpactError::invalid("pageNumber must be at least 1"));
        }
        Ok(())
    }

    /// `(size, page)` with config defaults filled in
    fn resolve(&self, config: &ImpactConfig) -> ImpactResult<(usize, usize)> {
        self.validate()?;
        Ok((
            self.page_size.unwrap_or(config.default_page_size),
            self.page_number.unwrap_or(config.default_page_number),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total_items: usize,
    pub total_pages: usize,
    pub size: usize,
    pub page: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PaginationMeta>,
}

impl<T> Paginated<T> {
    pub fn unpaginated(data: T) -> Self {
        Self {
            data,
            metadata: None,
        }
    }
}

fn page_window(total_items: usize, size: usize, page: usize) -> (std::ops::Range<usize>, PaginationMeta) {
    let start = page.saturating_sub(1).saturating_mul(size).min(total_items);
    let end = start.saturating_add(size).min(total_items);
    let meta = PaginationMeta {
        total_items,
        total_pages: total_items.div_ceil(size),
        size,
        page,
    };
    (start..end, meta)
}

/// Slice `items` to the requested page
pub fn paginate_items<T>(
    items: Vec<T>,
    fetch: &FetchSpecification,
    config: &ImpactConfig,
) -> ImpactResult<(Vec<T>, Option<PaginationMeta>)> {
    if fetch.disable_pagination {
        return Ok((items, None));
    }
    let (size, page) = fetch.resolve(config)?;
    let (window, meta) = page_window(items.len(), size, page);

    let sliced = items
        .into_iter()
        .skip(window.start)
        .take(window.len())
        .collect();
    Ok((sliced, Some(meta)))
}

/// Slice every indicator's root rows to the same page
///
/// Every indicator is built over the same entity forest, so the first
/// indicator's row count is the total.
pub fn paginate_rows<V>(
    tables: &mut [IndicatorTable<V>],
    fetch: &FetchSpecification,
    config: &ImpactConfig,
) -> ImpactResult<Option<PaginationMeta>> {
    if fetch.disable_pagination {
        return Ok(None);
    }
    let (size, page) = fetch.resolve(config)?;
    let total_items = tables.first().map_or(0, |table| table.rows.len());
    let (window, meta) = page_window(total_items, size, page);

    for table in tables.iter_mut() {
        let rows = std::mem::take(&mut table.rows);
        table.rows = rows
            .into_iter()
            .skip(window.start)
            .take(window.len())
            .collect();
    }

    Ok(Some(meta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_single_page() {
        let items: Vec<usize> = (0..10).collect();

        let (page, meta) =
            paginate_items(items, &FetchSpecification::page(10, 1), &ImpactConfig::default())
                .unwrap();

        assert_eq!(page.len(), 10);
        let meta = meta.unwrap();
        assert_eq!(meta.total_pages, 1);
        assert_eq!(meta.total_items, 10);
    }

    #[test]
    fn test_empty_input() {
        let (page, meta) = paginate_items(
            Vec::<usize>::new(),
            &FetchSpecification::page(10, 1),
            &ImpactConfig::default(),
        )
        .unwrap();

        assert!(page.is_empty());
        assert_eq!(meta.unwrap().total_pages, 0);
    }

    #[test]
    fn test_last_partial_page_and_beyond() {
        let items: Vec<usize> = (0..25).collect();
        let config = ImpactConfig::default();

        let (third, meta) =
            paginate_items(items.clone(), &FetchSpecification::page(10, 3), &config).unwrap();
        assert_eq!(third, vec![20, 21, 22, 23, 24]);
        assert_eq!(meta.unwrap().total_pages, 3);

        let (beyond, _) = paginate_items(items, &FetchSpecification::page(10, 7), &config).unwrap();
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_defaults_from_config() {
        let items: Vec<usize> = (0..30).collect();

        let (page, meta) =
            paginate_items(items, &FetchSpecification::default(), &ImpactConfig::default())
                .unwrap();

        assert_eq!(page.len(), 25);
        let meta = meta.unwrap();
        assert_eq!(meta.page, 1);
        assert_eq!(meta.size, 25);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_disabled_pagination_returns_everything() {
        let items: Vec<usize> = (0..30).collect();

        let (page, meta) =
            paginate_items(items, &FetchSpecification::unpaginated(), &ImpactConfig::default())
                .unwrap();

        assert_eq!(page.len(), 30);
        assert!(meta.is_none());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let result = paginate_items(
            vec![1, 2, 3],
            &FetchSpecification::page(0, 1),
            &ImpactConfig::default(),
        );
        assert!(matches!(result, Err(ImpactError::InvalidRequest(_))));
    }

    #[test]
    fn test_metadata_omitted_from_json_when_absent() {
        let json = serde_json::to_value(Paginated::unpaginated(vec![1])).unwrap();
        assert!(json.get("metadata").is_none());
        assert_eq!(json["data"], serde_json::json!([1]));
    }
}
