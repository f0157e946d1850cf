use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Canonical store lookup failed: {0}")]
    Store(String),

    #[error("Place lookup failed: {0}")]
    PlaceLookup(String),

    #[error("Unknown import record: {0}")]
    UnknownRecord(String),

    #[error("Record {id} cannot be processed from status {status}")]
    InvalidState { id: String, status: String },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
