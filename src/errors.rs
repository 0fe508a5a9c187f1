use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search request failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("No results in response")]
    MissingResults,

    #[error("Captured request is unusable: {reason}")]
    InvalidRequest { reason: String },
}

pub type Result<T> = std::result::Result<T, ExportError>;
