//! Error types for impact table construction

use thiserror::Error;

/// Failures surfaced by the table builders
///
/// Degenerate inputs (empty trees, empty data) are not errors: they produce
/// zeroed tables.
#[derive(Debug, Error)]
pub enum ImpactError {
    /// A requested indicator did not resolve, or flat rows referenced an
    /// indicator outside the resolved list
    #[error("indicator not found: {0}")]
    IndicatorNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Entity tree or flat data provider failure, passed through untouched
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl ImpactError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

pub type ImpactResult<T> = Result<T, ImpactError>;
