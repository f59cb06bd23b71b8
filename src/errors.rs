use serde::Serialize;

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Invalid field path: {0}")]
    InvalidPath(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => {
                ServiceError::ExternalApiError(format!("upstream returned {}: {}", status, err))
            }
            None => ServiceError::ExternalApiError(err.to_string()),
        }
    }
}

impl ServiceError {
    /// True for failures that stem from a defect in the calling code rather than
    /// from data or the environment.
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::InvalidPath(_))
    }

    /// Returns the error message suitable for end users.
    /// Transport and serialization failures return generic messages to avoid leaking details.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExternalApiError(_) => "Upstream service unavailable".to_string(),
            Self::SerializationError(_) | Self::Other(_) => "Unexpected response".to_string(),
            Self::InvalidPath(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}
