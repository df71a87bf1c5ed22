use serde::Serialize;
use std::collections::BTreeSet;

use crate::constants::{FALLBACK_MAX_YEAR, FALLBACK_MIN_YEAR, INDUSTRY_CHART_LIMIT, TOP_INDUSTRIES_CARD};
use crate::types::AlumniRecord;

use super::aggregate::{aggregate, ValueCount};
use super::filter::{filter, FilterSpec, YearRange};

/// Choices offered by the filter controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub industries: Vec<String>,
    pub locations: Vec<String>,
    pub year_bounds: YearRange,
    pub defaults: FilterSpec,
}

impl FilterOptions {
    pub fn from_records(records: &[AlumniRecord]) -> Self {
        let industries = sorted_unique(records.iter().map(|r| r.industry.as_str()));
        let locations = sorted_unique(records.iter().map(|r| r.current_location.as_str()));

        let years = records.iter().filter_map(|r| r.graduation_year);
        let (min, max) = match (years.clone().min(), years.max()) {
            (Some(min), Some(max)) => (min, max),
            _ => (FALLBACK_MIN_YEAR, FALLBACK_MAX_YEAR),
        };
        // the slider needs a non-empty span
        let min = if min >= max { max - 1 } else { min };

        Self {
            industries,
            locations,
            year_bounds: YearRange::new(min, max),
            defaults: Self::reset(),
        }
    }

    /// The state the "reset all filters" action returns to: empty search,
    /// no selections, and the year slider spanning everything.
    pub fn reset() -> FilterSpec {
        FilterSpec::default()
    }
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}

/// One row of the directory table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryRow {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Markdown mail link for the table cell
    pub email_link: String,
    pub graduation_year: Option<i32>,
    pub company: String,
    pub position: String,
    pub industry: String,
    pub current_location: String,
}

impl From<&AlumniRecord> for DirectoryRow {
    fn from(record: &AlumniRecord) -> Self {
        Self {
            name: record.full_name(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            email_link: mail_link(&record.email),
            graduation_year: record.graduation_year,
            company: record.company.clone(),
            position: record.position.clone(),
            industry: record.industry.clone(),
            current_location: record.current_location.clone(),
        }
    }
}

pub fn mail_link(email: &str) -> String {
    if email.is_empty() {
        String::new()
    } else {
        format!("[{email}](mailto:{email})")
    }
}

/// The filtered directory table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryView {
    pub spec: FilterSpec,
    pub count: usize,
    pub rows: Vec<DirectoryRow>,
}

impl DirectoryView {
    pub fn evaluate(records: &[AlumniRecord], spec: &FilterSpec) -> Self {
        let rows: Vec<DirectoryRow> = filter(records, spec).iter().map(DirectoryRow::from).collect();
        Self {
            spec: spec.clone(),
            count: rows.len(),
            rows,
        }
    }

    pub fn summary(&self) -> String {
        format!("Showing {} alumni", self.count)
    }
}

/// Cards and chart series for the insights tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightsView {
    pub total: usize,
    pub top_industry: String,
    pub top_industries: Vec<ValueCount<String>>,
    pub top_position: String,
    pub industry_chart: Vec<ValueCount<String>>,
    pub region_counts: Vec<ValueCount<String>>,
    pub year_counts: Vec<ValueCount<i32>>,
}

impl InsightsView {
    pub fn from_records(records: &[AlumniRecord]) -> Self {
        let agg = aggregate(records);
        Self {
            total: agg.total,
            top_industry: agg.top_industry(),
            top_industries: agg.top_industries(TOP_INDUSTRIES_CARD).to_vec(),
            top_position: agg.top_position.clone(),
            industry_chart: agg.top_industries(INDUSTRY_CHART_LIMIT).to_vec(),
            region_counts: agg.region_counts,
            year_counts: agg.year_counts,
        }
    }
}
