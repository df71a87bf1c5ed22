// Normalization pipeline: raw survey rows in, clean alumni records out

pub mod columns;
pub mod location;
pub mod text;
pub mod year;

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::constants::CONSENT_ANSWER;
use crate::observability::metrics;
use crate::types::{AlumniRecord, RawRow};

pub use columns::{resolve_header, Column, RenamedRow};
pub use location::LocationTable;
pub use text::title_case;
pub use year::parse_graduation_year;

/// Counts gathered during one normalization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub input_rows: usize,
    pub empty_rows_dropped: usize,
    pub duplicates_dropped: usize,
    pub years_unset: usize,
    pub companies_defaulted: usize,
    pub locations_remapped: usize,
    pub output_records: usize,
}

/// Normalize raw rows into the clean record set.
pub fn normalize(rows: &[RawRow], locations: &LocationTable) -> Vec<AlumniRecord> {
    normalize_with_report(rows, locations).0
}

/// Same as [`normalize`], also returning what was repaired or dropped.
///
/// Step order matters: renaming comes before typing, deduplication runs on
/// the email as received, and location mapping runs on the trimmed cell.
pub fn normalize_with_report(
    rows: &[RawRow],
    locations: &LocationTable,
) -> (Vec<AlumniRecord>, NormalizationReport) {
    let mut report = NormalizationReport {
        input_rows: rows.len(),
        ..Default::default()
    };

    // 1. drop fully empty rows
    let non_empty: Vec<&RawRow> = rows.iter().filter(|row| !row.is_blank()).collect();
    report.empty_rows_dropped = rows.len() - non_empty.len();

    // 2. rename onto canonical columns
    let renamed: Vec<RenamedRow> = non_empty
        .into_iter()
        .map(|row| {
            let (renamed, company_defaulted) = columns::rename(row);
            if company_defaulted {
                report.companies_defaulted += 1;
            }
            renamed
        })
        .collect();

    // 3. type the graduation year
    let typed: Vec<AlumniRecord> = renamed
        .into_iter()
        .map(|row| {
            let graduation_year = parse_graduation_year(&row.graduation_year);
            if graduation_year.is_none() {
                if !row.graduation_year.trim().is_empty() {
                    debug!(raw = %row.graduation_year, "Unparsable graduation year left unset");
                }
                report.years_unset += 1;
            }
            into_record(row, graduation_year)
        })
        .collect();

    // 4. first occurrence of each email wins
    let mut seen = HashSet::new();
    let mut records: Vec<AlumniRecord> = Vec::with_capacity(typed.len());
    for record in typed {
        if seen.insert(record.email.clone()) {
            records.push(record);
        } else {
            debug!(email = %record.email, "Dropping duplicate response");
            report.duplicates_dropped += 1;
        }
    }

    for record in &mut records {
        // 5. title-case the categorical text
        record.industry = title_case(&record.industry);
        record.favorite_position = title_case(&record.favorite_position);

        // 6. trim
        record.email = record.email.trim().to_string();
        record.current_location = record.current_location.trim().to_string();
        record.industry = record.industry.trim().to_string();
        record.position = record.position.trim().to_string();

        // 7. canonicalize the location, then trim again
        let canonical = locations.canonicalize(&record.current_location);
        if canonical != record.current_location {
            report.locations_remapped += 1;
        }
        record.current_location = canonical;
    }

    report.output_records = records.len();
    info!(
        input_rows = report.input_rows,
        empty_rows_dropped = report.empty_rows_dropped,
        duplicates_dropped = report.duplicates_dropped,
        years_unset = report.years_unset,
        locations_remapped = report.locations_remapped,
        output_records = report.output_records,
        "Normalization finished"
    );
    metrics::pipeline::normalization_finished(&report);

    (records, report)
}

fn into_record(row: RenamedRow, graduation_year: Option<i32>) -> AlumniRecord {
    let comments = if row.comments.trim().is_empty() {
        None
    } else {
        Some(row.comments)
    };

    AlumniRecord {
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        graduation_year,
        company: row.company,
        position: row.position,
        industry: row.industry,
        favorite_position: row.favorite_position,
        current_location: row.current_location,
        open_to_contact: row.open_to_contact == CONSENT_ANSWER,
        receive_updates: row.receive_updates == CONSENT_ANSWER,
        comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn response(
        first: &str,
        email: &str,
        year: &str,
        industry: &str,
        location: &str,
    ) -> RawRow {
        RawRow::from_pairs([
            (FIRST_NAME, first),
            (LAST_NAME, "Smith"),
            (SOURCE_EMAIL, email),
            (SOURCE_GRADUATION_YEAR, year),
            (SOURCE_COMPANY, "Acme"),
            (SOURCE_POSITION, " Analyst "),
            (INDUSTRY, industry),
            (CURRENT_LOCATION, location),
            (SOURCE_OPEN_TO_CONTACT, "Yes"),
            (SOURCE_FAVORITE_POSITION, "scrum half"),
        ])
    }

    #[test]
    fn test_duplicate_email_keeps_first_occurrence() {
        let rows = vec![
            response("Ann", "ann@example.com", "2015", "finance", "NYC"),
            response("Annie", "ann@example.com", "2019", "tech", "Boston"),
            response("Bob", "bob@example.com", "2016", "tech", "Boston"),
        ];

        let (records, report) = normalize_with_report(&rows, LocationTable::builtin());
        assert_eq!(records.len(), 2);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(records[0].first_name, "Ann");
        assert_eq!(records[0].graduation_year, Some(2015));
        assert_eq!(records[0].industry, "Finance");
        assert_eq!(records[1].email, "bob@example.com");
    }

    #[test]
    fn test_email_dedup_is_case_sensitive() {
        let rows = vec![
            response("Ann", "ann@example.com", "2015", "finance", "NYC"),
            response("Ann", "Ann@example.com", "2015", "finance", "NYC"),
        ];
        assert_eq!(normalize(&rows, LocationTable::builtin()).len(), 2);
    }

    #[test]
    fn test_empty_rows_are_dropped_anywhere() {
        let blank = RawRow::from_pairs([(FIRST_NAME, ""), (SOURCE_EMAIL, "  "), (INDUSTRY, "")]);
        let rows = vec![
            blank.clone(),
            response("Ann", "ann@example.com", "2015", "finance", "NYC"),
            blank.clone(),
            response("Bob", "bob@example.com", "2016", "tech", "Boston"),
            blank,
        ];

        let (records, report) = normalize_with_report(&rows, LocationTable::builtin());
        assert_eq!(records.len(), 2);
        assert_eq!(report.empty_rows_dropped, 3);
        assert_eq!(report.input_rows, 5);
    }

    #[test]
    fn test_year_variants() {
        let rows = vec![
            response("A", "a@example.com", "Class of 2015", "x", ""),
            response("B", "b@example.com", "unknown", "x", ""),
            response("C", "c@example.com", "2015.0", "x", ""),
        ];

        let (records, report) = normalize_with_report(&rows, LocationTable::builtin());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].graduation_year, Some(2015));
        assert_eq!(records[1].graduation_year, None);
        assert_eq!(records[2].graduation_year, Some(2015));
        assert_eq!(report.years_unset, 1);
    }

    #[test]
    fn test_text_cleanup_and_location_canonicalization() {
        let rows = vec![
            response("A", " a@example.com ", "2015", "financial services", "NYC"),
            response("B", "b@example.com", "2016", "tech", "  Austin "),
            response("C", "c@example.com", "2016", "tech", "boston, ma"),
        ];

        let records = normalize(&rows, LocationTable::builtin());
        assert_eq!(records[0].email, "a@example.com");
        assert_eq!(records[0].industry, "Financial Services");
        assert_eq!(records[0].current_location, "New York, NY");
        assert_eq!(records[0].position, "Analyst");
        assert_eq!(records[0].favorite_position, "Scrum Half");
        assert_eq!(records[1].current_location, "Austin");
        // location case is never touched
        assert_eq!(records[2].current_location, "boston, ma");
    }

    #[test]
    fn test_missing_fields_are_repaired() {
        let rows = vec![RawRow::from_pairs([
            (FIRST_NAME, "Solo"),
            (SOURCE_EMAIL, "solo@example.com"),
        ])];

        let (records, report) = normalize_with_report(&rows, LocationTable::builtin());
        let record = &records[0];
        assert_eq!(record.company, NOT_AVAILABLE);
        assert_eq!(record.graduation_year, None);
        assert_eq!(record.current_location, "");
        assert!(!record.open_to_contact);
        assert!(record.comments.is_none());
        assert_eq!(report.companies_defaulted, 1);
    }

    #[test]
    fn test_consent_requires_exact_yes() {
        let mut yes = response("A", "a@example.com", "2015", "x", "");
        yes.insert(SOURCE_RECEIVE_UPDATES, "Yes");
        let mut lower = response("B", "b@example.com", "2015", "x", "");
        lower.insert(SOURCE_OPEN_TO_CONTACT, "yes");

        let records = normalize(&[yes, lower], LocationTable::builtin());
        assert!(records[0].open_to_contact);
        assert!(records[0].receive_updates);
        assert!(!records[1].open_to_contact);
        assert!(!records[1].receive_updates);
    }
}
