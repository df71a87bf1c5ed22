use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::observability::metrics;
use crate::types::AlumniRecord;

/// Inclusive graduation-year bounds from the range slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Unset years never fall inside a range. A range with `min > max`
    /// contains nothing.
    pub fn contains(&self, year: Option<i32>) -> bool {
        matches!(year, Some(y) if self.min <= y && y <= self.max)
    }
}

/// Constraints for one evaluation of the directory table.
///
/// Empty sets and a `None` search or range impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub search_text: Option<String>,
    pub industries: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub year_range: Option<YearRange>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industries.insert(industry.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.insert(location.into());
        self
    }

    pub fn with_year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = Some(YearRange::new(min, max));
        self
    }

    fn search_needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
    }

    /// Whether a single record satisfies every active constraint,
    /// including the consent baseline.
    pub fn matches(&self, record: &AlumniRecord) -> bool {
        self.matches_with_needle(record, self.search_needle().as_deref())
    }

    fn matches_with_needle(&self, record: &AlumniRecord, needle: Option<&str>) -> bool {
        if !record.open_to_contact {
            return false;
        }

        if let Some(needle) = needle {
            let hit = [
                &record.first_name,
                &record.last_name,
                &record.company,
                &record.position,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }

        if !self.industries.is_empty() && !self.industries.contains(&record.industry) {
            return false;
        }

        if !self.locations.is_empty() && !self.locations.contains(&record.current_location) {
            return false;
        }

        match &self.year_range {
            Some(range) => range.contains(record.graduation_year),
            None => true,
        }
    }
}

/// Records that consented to contact and satisfy `spec`, in input order.
pub fn filter(records: &[AlumniRecord], spec: &FilterSpec) -> Vec<AlumniRecord> {
    let needle = spec.search_needle();
    let filtered: Vec<AlumniRecord> = records
        .iter()
        .filter(|r| spec.matches_with_needle(r, needle.as_deref()))
        .cloned()
        .collect();

    metrics::query::filter_evaluated(filtered.len());
    filtered
}

/// The consent-gated set with no other constraint applied.
pub fn contactable(records: &[AlumniRecord]) -> Vec<AlumniRecord> {
    records.iter().filter(|r| r.open_to_contact).cloned().collect()
}
