use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};

const BUILTIN_TABLE: &str = include_str!("../../config/locations.toml");

static BUILTIN: Lazy<LocationTable> = Lazy::new(|| match LocationTable::from_toml_str(BUILTIN_TABLE) {
    Ok(table) => table,
    Err(e) => {
        warn!("Built-in location table is invalid, using an empty one: {}", e);
        LocationTable::default()
    }
});

#[derive(Debug, Deserialize)]
struct LocationFile {
    #[serde(default)]
    mappings: HashMap<String, String>,
}

/// Read-only mapping from a free-text location to its canonical
/// `"City, Region"` spelling. Unmapped inputs pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTable {
    mappings: HashMap<String, String>,
}

impl LocationTable {
    /// The table shipped with the crate (`config/locations.toml`).
    pub fn builtin() -> &'static LocationTable {
        &BUILTIN
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mappings = pairs
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_string(), v.into()))
            .collect();
        Self { mappings }
    }

    /// Parse a `[mappings]` table. Keys are trimmed, since lookups always
    /// happen on trimmed cells.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LocationFile = toml::from_str(content)?;
        Ok(Self::from_pairs(file.mappings))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!(
                "Failed to read location table '{}': {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_toml_str(&content)?;
        info!(entries = table.len(), path = %path.display(), "Loaded location table");
        Ok(table)
    }

    pub fn lookup(&self, location: &str) -> Option<&str> {
        self.mappings.get(location).map(|s| s.as_str())
    }

    /// Exact-match lookup followed by a trim for unmapped variants.
    pub fn canonicalize(&self, location: &str) -> String {
        self.lookup(location).unwrap_or(location).trim().to_string()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
