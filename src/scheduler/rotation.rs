//! Deterministic daily rotation over catalog categories
//!
//! One category is probed per day: `ids[day_of_year % ids.len()]`. The same
//! date and the same ordered id list always produce the same category, and a
//! window of `ids.len()` consecutive days visits every category exactly once.

use chrono::{Datelike, NaiveDate};

use crate::models::{Catalog, Category};

/// Pick the identifier for a calendar day number.
///
/// Returns `None` when there is nothing to pick from.
pub fn select_for_day<S: AsRef<str>>(ids: &[S], day_of_year: u32) -> Option<&str> {
    if ids.is_empty() {
        return None;
    }
    let index = day_of_year as usize % ids.len();
    Some(ids[index].as_ref())
}

/// Day-based category selector
#[derive(Debug, Clone, Copy)]
pub struct RotationSelector {
    date: NaiveDate,
}

impl RotationSelector {
    /// Selector for the given calendar date
    pub fn for_date(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Selector for today in local time
    pub fn today() -> Self {
        Self::for_date(chrono::Local::now().date_naive())
    }

    /// Day of year, 1-based (January 1st is 1)
    pub fn day_of_year(&self) -> u32 {
        self.date.ordinal()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Select today's category from the catalog
    pub fn select<'a>(&self, catalog: &'a Catalog) -> Option<&'a Category> {
        let ids = catalog.ids();
        let id = select_for_day(&ids, self.day_of_year())?;
        catalog.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_input() {
        let ids: Vec<String> = Vec::new();
        assert_eq!(select_for_day(&ids, 42), None);
    }

    #[test]
    fn test_modulo_selection() {
        let ids = ["News", "Sports", "Movies"];
        assert_eq!(select_for_day(&ids, 0), Some("News"));
        assert_eq!(select_for_day(&ids, 1), Some("Sports"));
        assert_eq!(select_for_day(&ids, 5), Some("Movies"));
        assert_eq!(select_for_day(&ids, 366), Some("News"));
    }

    #[test]
    fn test_deterministic() {
        let ids = ["A", "B", "C", "D", "E"];
        for day in 1..=366 {
            assert_eq!(select_for_day(&ids, day), select_for_day(&ids, day));
        }
    }

    #[test]
    fn test_full_cycle_visits_each_once() {
        let ids = ["A", "B", "C", "D", "E", "F", "G"];
        for start in [1_u32, 17, 200] {
            let visited: Vec<_> = (start..start + ids.len() as u32)
                .filter_map(|day| select_for_day(&ids, day))
                .collect();
            let unique: HashSet<_> = visited.iter().collect();
            assert_eq!(visited.len(), ids.len());
            assert_eq!(unique.len(), ids.len());
        }
    }

    #[test]
    fn test_day_of_year_is_one_based() {
        let selector = RotationSelector::for_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(selector.day_of_year(), 1);

        let selector = RotationSelector::for_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(selector.day_of_year(), 366);
    }

    #[test]
    fn test_select_from_catalog() {
        let catalog = crate::catalog::parse_catalog(
            "News,#genre#\nCNN,http://a\nSports,#genre#\nESPN,http://b\n",
        );
        // Jan 1st -> day 1 -> index 1
        let selector = RotationSelector::for_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(selector.select(&catalog).unwrap().id, "Sports");

        let selector = RotationSelector::for_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(selector.select(&catalog).unwrap().id, "News");

        assert!(selector.select(&Catalog::new()).is_none());
    }
}
