//! Requested year range helpers

/// Inclusive, ascending range of years
///
/// Empty when `start_year > end_year`; callers validate requests beforehand.
pub fn range_of_years(start_year: i32, end_year: i32) -> Vec<i32> {
    (start_year..=end_year).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_of_years() {
        assert_eq!(range_of_years(2020, 2023), vec![2020, 2021, 2022, 2023]);
        assert_eq!(range_of_years(2020, 2020), vec![2020]);
        assert!(range_of_years(2021, 2020).is_empty());
    }
}
