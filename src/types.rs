use serde::{Deserialize, Serialize};

/// One raw spreadsheet row as `(header label, cell)` pairs in source column
/// order. Labels are kept exactly as they appear in the file, duplicates
/// included. Absent and blank cells are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { cells }
    }

    /// Append a cell after the existing ones.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.cells.push((label.into(), value.into()));
    }

    /// The first cell under `label`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    /// True when every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }

    /// Cells in source column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A cleaned alumni record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlumniRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub graduation_year: Option<i32>,
    pub company: String,
    pub position: String,
    pub industry: String,
    pub favorite_position: String,
    pub current_location: String,
    pub open_to_contact: bool,
    pub receive_updates: bool,
    pub comments: Option<String>,
}

impl AlumniRecord {
    /// First and last name joined by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_keeps_column_order_and_duplicates() {
        let mut row = RawRow::new();
        row.insert("Industry", "");
        row.insert("First Name", "Ann");
        row.insert("Industry", "Tech");

        let labels: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(labels, vec!["Industry", "First Name", "Industry"]);
        assert_eq!(row.get("Industry"), Some(""));
        assert!(!row.is_blank());
    }
}
