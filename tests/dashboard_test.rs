use std::io::Write;
use std::sync::Arc;

use alumni_dashboard::constants::SOURCE_OPEN_TO_CONTACT;
use alumni_dashboard::dataset::DatasetCache;
use alumni_dashboard::export;
use alumni_dashboard::pipeline::LocationTable;
use alumni_dashboard::query::{DirectoryView, FilterOptions, FilterSpec, InsightsView};

fn survey_csv() -> tempfile::NamedTempFile {
    let header = format!(
        "\u{feff}First Name,Last Name,Preferred Email,Graduation Year (####),Current Company,Current Position / Title,Industry,Current Location,\"{}\"",
        SOURCE_OPEN_TO_CONTACT
    );
    let rows = [
        "Ann,Lee,ann@example.com,Class of 2015,Acme,Analyst,finance,NYC,Yes",
        "ann,lee,ann@example.com,2016,Acme,Analyst,finance,NYC,Yes",
        ",,,,,,,,",
        "bob,ray,bob@example.com,unknown,,Engineer,tech,Seattle,Yes",
        "cy,park,cy@example.com,2012,Globex,Partner,finance,\"Boston, MA\",No",
    ];

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", header).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

#[test]
fn test_end_to_end_directory_insights_and_export() {
    let file = survey_csv();
    let cache = Arc::new(DatasetCache::new(file.path(), LocationTable::builtin().clone()));
    let dataset = cache.get().unwrap();

    // blank row dropped, second Ann collapsed onto the first
    assert_eq!(dataset.len(), 3);
    let report = dataset.report();
    assert_eq!(report.empty_rows_dropped, 1);
    assert_eq!(report.duplicates_dropped, 1);

    let ann = &dataset.records()[0];
    assert_eq!(ann.first_name, "Ann");
    assert_eq!(ann.graduation_year, Some(2015));
    assert_eq!(ann.current_location, "New York, NY");
    assert_eq!(ann.industry, "Finance");

    let bob = &dataset.records()[1];
    assert_eq!(bob.graduation_year, None);
    assert_eq!(bob.company, "N/A");
    assert_eq!(bob.current_location, "Seattle, WA");

    let options = FilterOptions::from_records(dataset.records());
    assert_eq!(options.industries, vec!["Finance", "Tech"]);
    assert_eq!((options.year_bounds.min, options.year_bounds.max), (2012, 2015));

    // Cy did not consent and never shows in the directory
    let all = DirectoryView::evaluate(dataset.records(), &FilterOptions::reset());
    assert_eq!(all.summary(), "Showing 2 alumni");

    let finance = DirectoryView::evaluate(dataset.records(), &FilterSpec::new().with_industry("Finance"));
    assert_eq!(finance.count, 1);
    assert_eq!(finance.rows[0].email_link, "[ann@example.com](mailto:ann@example.com)");

    let insights = InsightsView::from_records(dataset.records());
    assert_eq!(insights.total, 3);
    assert_eq!(insights.top_industry, "Finance");

    let text = String::from_utf8(export::export_to_bytes(dataset.records()).unwrap()).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(!text.contains("cy@example.com"));
}

#[test]
fn test_missing_file_is_unavailable_until_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alumni_data.csv");
    let cache = DatasetCache::new(&path, LocationTable::builtin().clone());

    let err = cache.get().unwrap_err();
    assert!(err.path.ends_with("alumni_data.csv"));

    std::fs::copy(survey_csv().path(), &path).unwrap();
    assert!(cache.get().is_err());
    assert_eq!(cache.reload().unwrap().len(), 3);
}
