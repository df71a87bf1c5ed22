use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::constants::NOT_AVAILABLE;
use crate::types::AlumniRecord;

// Two-letter region code at the end of a canonical "City, ST" location
static REGION_SUFFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"([A-Z]{2})$").ok());

/// A value and how many records carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount<T> {
    pub value: T,
    pub count: usize,
}

/// Global insight summaries over a record set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    /// Descending by count, ties in first-seen order
    pub industry_counts: Vec<ValueCount<String>>,
    /// Most frequent non-empty favorite position, or "N/A"
    pub top_position: String,
    /// Descending by count, ties in first-seen order
    pub region_counts: Vec<ValueCount<String>>,
    /// Ascending by year
    pub year_counts: Vec<ValueCount<i32>>,
    pub total: usize,
}

impl Aggregates {
    pub fn top_industry(&self) -> String {
        self.industry_counts
            .first()
            .map(|c| c.value.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn top_industries(&self, n: usize) -> &[ValueCount<String>] {
        &self.industry_counts[..n.min(self.industry_counts.len())]
    }
}

/// Summaries over `records`. Callers pass the full clean set for the
/// insights tab, not the filtered view.
pub fn aggregate(records: &[AlumniRecord]) -> Aggregates {
    let industry_counts = value_counts(
        records
            .iter()
            .map(|r| r.industry.as_str())
            .filter(|s| !s.is_empty()),
    );

    let top_position = value_counts(
        records
            .iter()
            .map(|r| r.favorite_position.trim())
            .filter(|s| !s.is_empty()),
    )
    .into_iter()
    .next()
    .map(|c| c.value)
    .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let region_counts = value_counts(records.iter().filter_map(|r| region_code(&r.current_location)));

    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.graduation_year) {
        *years.entry(year).or_insert(0) += 1;
    }
    let year_counts = years
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();

    Aggregates {
        industry_counts,
        top_position,
        region_counts,
        year_counts,
        total: records.len(),
    }
}

/// Trailing two-uppercase-letter region code, e.g. `"NY"` from
/// `"New York, NY"`.
pub fn region_code(location: &str) -> Option<&str> {
    REGION_SUFFIX
        .as_ref()?
        .captures(location)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<ValueCount<String>> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<ValueCount<String>> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(ValueCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(industry: &str, position: &str, location: &str, year: Option<i32>) -> AlumniRecord {
        AlumniRecord {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: String::new(),
            graduation_year: year,
            company: "N/A".to_string(),
            position: String::new(),
            industry: industry.to_string(),
            favorite_position: position.to_string(),
            current_location: location.to_string(),
            open_to_contact: false,
            receive_updates: false,
            comments: None,
        }
    }

    #[test]
    fn test_industry_counts_descending_with_first_seen_ties() {
        let records = vec![
            record("Tech", "", "", None),
            record("Finance", "", "", None),
            record("Finance", "", "", None),
            record("Law", "", "", None),
            record("Tech", "", "", None),
            record("", "", "", None),
        ];

        let agg = aggregate(&records);
        let order: Vec<(&str, usize)> = agg
            .industry_counts
            .iter()
            .map(|c| (c.value.as_str(), c.count))
            .collect();
        assert_eq!(order, vec![("Tech", 2), ("Finance", 2), ("Law", 1)]);
        assert_eq!(agg.top_industry(), "Tech");
        assert_eq!(agg.top_industries(2).len(), 2);
        assert_eq!(agg.top_industries(10).len(), 3);
        assert_eq!(agg.total, 6);

        let with_industry = records.iter().filter(|r| !r.industry.is_empty()).count();
        let summed: usize = agg.industry_counts.iter().map(|c| c.count).sum();
        assert_eq!(summed, with_industry);
    }

    #[test]
    fn test_top_position_is_mode_of_non_empty() {
        let records = vec![
            record("", "", "", None),
            record("", "Wing", "", None),
            record("", "Prop", "", None),
            record("", "Prop", "", None),
            record("", "", "", None),
            record("", "", "", None),
        ];
        assert_eq!(aggregate(&records).top_position, "Prop");

        let blanks = vec![record("", "", "", None), record("", " ", "", None)];
        assert_eq!(aggregate(&blanks).top_position, "N/A");
    }

    #[test]
    fn test_region_counts_skip_locations_without_suffix() {
        let records = vec![
            record("", "", "New York, NY", None),
            record("", "", "Boston, MA", None),
            record("", "", "Brooklyn, NY", None),
            record("", "", "London, UK", None),
            record("", "", "Jakarta, Indonesia", None),
            record("", "", "boston, ma", None),
            record("", "", "", None),
        ];

        let agg = aggregate(&records);
        let regions: Vec<(&str, usize)> = agg
            .region_counts
            .iter()
            .map(|c| (c.value.as_str(), c.count))
            .collect();
        assert_eq!(regions, vec![("NY", 2), ("MA", 1), ("UK", 1)]);
    }

    #[test]
    fn test_year_counts_ascending_without_unset() {
        let records = vec![
            record("", "", "", Some(2018)),
            record("", "", "", Some(2012)),
            record("", "", "", None),
            record("", "", "", Some(2018)),
        ];

        let agg = aggregate(&records);
        assert_eq!(
            agg.year_counts,
            vec![
                ValueCount { value: 2012, count: 1 },
                ValueCount { value: 2018, count: 2 },
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate(&[]);
        assert!(agg.industry_counts.is_empty());
        assert!(agg.region_counts.is_empty());
        assert!(agg.year_counts.is_empty());
        assert_eq!(agg.total, 0);
        assert_eq!(agg.top_industry(), "N/A");
        assert_eq!(agg.top_position, "N/A");
    }

    #[test]
    fn test_region_code() {
        assert_eq!(region_code("Seattle, WA"), Some("WA"));
        assert_eq!(region_code("Seattle, WA "), None);
        assert_eq!(region_code("Toronto, ON"), Some("ON"));
        assert_eq!(region_code("Basel, Switzerland"), None);
    }
}
