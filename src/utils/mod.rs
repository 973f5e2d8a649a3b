//! Small numeric helpers shared across the table pipeline
//!
//! - Growth: compounding projection and percentage difference
//! - Years: inclusive year ranges

pub mod growth;
pub mod years;

pub use growth::{grow, percentage_difference};
pub use years::range_of_years;
