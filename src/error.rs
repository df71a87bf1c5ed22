use thiserror::Error;

/// The source dataset could not be read at all.
///
/// Cloneable so a failed load can be cached and reported on every access
/// until someone asks for an explicit reload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("data unavailable ({path}): {reason}")]
pub struct DataUnavailable {
    pub path: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Refusing to overwrite the source data file '{path}'")]
    OverwritesSource { path: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),

    #[error("Assistant error: {message}")]
    Assistant { message: String },

    #[error("No API key configured for the assistant (set OPENAI_API_KEY)")]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
