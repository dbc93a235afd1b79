use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Clipboard Error: {0}")]
    Clipboard(String),

    #[error("Glob Pattern Error: {0}")]
    Glob(String),

    #[error("Fetch Error: URL '{url}', Error: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid options for collector '{collector}': {reason}")]
    InvalidOptions { collector: String, reason: String },

    #[error("Invalid function provided: {0}")]
    InvalidFunction(String),

    #[error("Function must return an array of GatheredInformation objects: {0}")]
    InvalidGatherResult(String),

    #[error("Function '{command}' failed: {reason}")]
    FunctionFailed { command: String, reason: String },

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

impl AppError {
    pub fn invalid_options(collector: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidOptions {
            collector: collector.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(format!("Globset error: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::TomlParse(err.to_string())
    }
}
