use crate::constants::*;
use crate::types::RawRow;

/// Canonical business fields of the alumni sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    FirstName,
    LastName,
    Email,
    GraduationYear,
    Company,
    Position,
    Industry,
    FavoritePosition,
    CurrentLocation,
    OpenToContact,
    ReceiveUpdates,
    Comments,
}

impl Column {
    pub fn label(&self) -> &'static str {
        match self {
            Column::FirstName => FIRST_NAME,
            Column::LastName => LAST_NAME,
            Column::Email => EMAIL,
            Column::GraduationYear => GRADUATION_YEAR,
            Column::Company => COMPANY,
            Column::Position => POSITION,
            Column::Industry => INDUSTRY,
            Column::FavoritePosition => FAVORITE_POSITION,
            Column::CurrentLocation => CURRENT_LOCATION,
            Column::OpenToContact => OPEN_TO_CONTACT,
            Column::ReceiveUpdates => RECEIVE_UPDATES,
            Column::Comments => COMMENTS,
        }
    }

    pub fn all() -> impl Iterator<Item = Column> {
        use Column::*;
        [
            FirstName,
            LastName,
            Email,
            GraduationYear,
            Company,
            Position,
            Industry,
            FavoritePosition,
            CurrentLocation,
            OpenToContact,
            ReceiveUpdates,
            Comments,
        ]
        .into_iter()
    }
}

/// Survey form labels that rename onto a canonical column. Canonical labels
/// themselves are also accepted (see [`resolve_header`]).
const RENAMES: &[(&str, Column)] = &[
    (SOURCE_EMAIL, Column::Email),
    (SOURCE_GRADUATION_YEAR, Column::GraduationYear),
    (SOURCE_COMPANY, Column::Company),
    (SOURCE_POSITION, Column::Position),
    (SOURCE_OPEN_TO_CONTACT, Column::OpenToContact),
    (SOURCE_RECEIVE_UPDATES, Column::ReceiveUpdates),
    (SOURCE_RECEIVE_UPDATES_GENERIC, Column::ReceiveUpdates),
    (SOURCE_FAVORITE_POSITION, Column::FavoritePosition),
    (SOURCE_COMMENTS, Column::Comments),
];

/// Map a source header onto its canonical column, ignoring surrounding
/// whitespace and a leading byte-order mark. Unknown headers map to `None`.
pub fn resolve_header(header: &str) -> Option<Column> {
    let header = header.trim_start_matches('\u{feff}').trim();

    RENAMES
        .iter()
        .find(|(label, _)| *label == header)
        .map(|(_, column)| *column)
        .or_else(|| Column::all().find(|c| c.label() == header))
}

/// A raw row after renaming: every canonical field present, still untyped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamedRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub graduation_year: String,
    pub company: String,
    pub position: String,
    pub industry: String,
    pub favorite_position: String,
    pub current_location: String,
    pub open_to_contact: String,
    pub receive_updates: String,
    pub comments: String,
}

impl RenamedRow {
    fn slot(&mut self, column: Column) -> &mut String {
        match column {
            Column::FirstName => &mut self.first_name,
            Column::LastName => &mut self.last_name,
            Column::Email => &mut self.email,
            Column::GraduationYear => &mut self.graduation_year,
            Column::Company => &mut self.company,
            Column::Position => &mut self.position,
            Column::Industry => &mut self.industry,
            Column::FavoritePosition => &mut self.favorite_position,
            Column::CurrentLocation => &mut self.current_location,
            Column::OpenToContact => &mut self.open_to_contact,
            Column::ReceiveUpdates => &mut self.receive_updates,
            Column::Comments => &mut self.comments,
        }
    }
}

/// Rename a raw row onto the canonical columns.
///
/// Unmapped source columns are ignored. When two source headers map to the
/// same column the first non-blank value in column order wins. Returns the renamed row and
/// whether the company had to be defaulted.
pub fn rename(row: &RawRow) -> (RenamedRow, bool) {
    let mut renamed = RenamedRow::default();

    for (header, value) in row.iter() {
        if let Some(column) = resolve_header(header) {
            let slot = renamed.slot(column);
            if slot.trim().is_empty() {
                *slot = value.to_string();
            }
        }
    }

    let company_defaulted = renamed.company.trim().is_empty();
    if company_defaulted {
        renamed.company = NOT_AVAILABLE.to_string();
    }

    (renamed, company_defaulted)
}
