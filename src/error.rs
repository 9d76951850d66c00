use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Failed to fetch {source_name}: {message}")]
    Fetch {
        source_name: &'static str,
        message: String,
    },

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed source data: {0}")]
    Parse(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Failure class reported to callers of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fetch,
    DataFormat,
    Internal,
}

impl ErrorCategory {
    pub fn describe(self) -> &'static str {
        match self {
            ErrorCategory::Fetch => "Error fetching upstream data",
            ErrorCategory::DataFormat => "Error parsing upstream data",
            ErrorCategory::Internal => "An unexpected error occurred",
        }
    }
}

impl ScraperError {
    pub fn fetch(source_name: &'static str, message: impl Into<String>) -> Self {
        ScraperError::Fetch {
            source_name,
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ScraperError::Storage {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ScraperError::Fetch { .. } => ErrorCategory::Fetch,
            ScraperError::Csv(_) | ScraperError::Parse(_) => ErrorCategory::DataFormat,
            _ => ErrorCategory::Internal,
        }
    }
}

#[cfg(feature = "db")]
impl From<libsql::Error> for ScraperError {
    fn from(err: libsql::Error) -> Self {
        ScraperError::Storage {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
