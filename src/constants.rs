/// Column label constants to keep the raw sheet, the clean record set and the
/// export in agreement across the codebase.

// Sentinel for single-value summaries and missing companies
pub const NOT_AVAILABLE: &str = "N/A";

// Exact answer that counts as consent in the yes/no survey columns
pub const CONSENT_ANSWER: &str = "Yes";

// Canonical column labels (after renaming)
pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const NAME: &str = "Name";
pub const EMAIL: &str = "Email";
pub const GRADUATION_YEAR: &str = "Graduation Year";
pub const COMPANY: &str = "Company";
pub const POSITION: &str = "Position";
pub const INDUSTRY: &str = "Industry";
pub const FAVORITE_POSITION: &str = "Favorite Position";
pub const CURRENT_LOCATION: &str = "Current Location";
pub const OPEN_TO_CONTACT: &str = "Open to Contact";
pub const RECEIVE_UPDATES: &str = "Receive Updates";
pub const COMMENTS: &str = "Comments";

// Survey form labels as they appear in the response spreadsheet
pub const SOURCE_EMAIL: &str = "Preferred Email";
pub const SOURCE_GRADUATION_YEAR: &str = "Graduation Year (####)";
pub const SOURCE_COMPANY: &str = "Current Company";
pub const SOURCE_POSITION: &str = "Current Position / Title";
pub const SOURCE_OPEN_TO_CONTACT: &str = "Are you open to being contacted by current students in the club for recruiting-related purposes, such as coffee chats or networking?";
pub const SOURCE_RECEIVE_UPDATES: &str = "Would you like to stay informed about the CBS Rugby Football Club's activities and updates throughout the year?";
pub const SOURCE_RECEIVE_UPDATES_GENERIC: &str = "Would you like to stay informed about the club's activities and updates throughout the year?";
pub const SOURCE_FAVORITE_POSITION: &str = "Favorite rugby position? (name)";
pub const SOURCE_COMMENTS: &str = "Any other comments you would like to make? (Questions, suggestions, nostalgia, etc)";

/// Export columns, in download order
pub const EXPORT_COLUMNS: [&str; 7] = [
    NAME,
    EMAIL,
    GRADUATION_YEAR,
    COMPANY,
    POSITION,
    INDUSTRY,
    CURRENT_LOCATION,
];

// Defaults
pub const DEFAULT_DATA_PATH: &str = "alumni_data.csv";
pub const DEFAULT_EXPORT_FILENAME: &str = "alumni_export.csv";
pub const DEFAULT_EXPORT_WORKBOOK: &str = "alumni_export.xlsx";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

// Slider bounds used when no graduation year could be parsed
pub const FALLBACK_MIN_YEAR: i32 = 2000;
pub const FALLBACK_MAX_YEAR: i32 = 2025;

// Cards on the insights tab
pub const TOP_INDUSTRIES_CARD: usize = 3;
pub const INDUSTRY_CHART_LIMIT: usize = 10;
