use crate::domain::model::{ObjectKey, ResourceKind};
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a resource store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{key} already exists")]
    AlreadyExists { key: ObjectKey },

    #[error("{key} not found")]
    NotFound { key: ObjectKey },

    #[error("invalid object key {value:?}: {reason}")]
    InvalidKey { value: String, reason: String },

    #[error("expected a {expected} object, found {found}")]
    KindMismatch {
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of a rejected provisioning request.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("{0}")]
    Validation(String),

    #[error("{name} instance already exists")]
    Conflict { name: String },

    #[error("instance not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProvisionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

#[derive(Error, Debug)]
pub enum RpaasError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API responded with {status}: {message}")]
    ApiStatusError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl RpaasError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RpaasError::ApiStatusError { status, .. } if *status < 500 => ErrorSeverity::High,
            RpaasError::ApiError(_) | RpaasError::ApiStatusError { .. } => ErrorSeverity::Medium,
            RpaasError::ConfigError { .. }
            | RpaasError::InvalidConfigValueError { .. }
            | RpaasError::MissingConfigError { .. } => ErrorSeverity::High,
            RpaasError::IoError(_)
            | RpaasError::SerializationError(_)
            | RpaasError::StoreError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RpaasError::ApiError(e) if e.is_connect() => {
                "Could not reach the rpaas API".to_string()
            }
            RpaasError::ApiError(e) if e.is_timeout() => "The rpaas API timed out".to_string(),
            RpaasError::ApiStatusError { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RpaasError::ApiError(_) => "Check --api-url and that the rpaas API is running",
            RpaasError::ApiStatusError { status, .. } if *status == 404 => {
                "Check that the instance name is correct"
            }
            RpaasError::ApiStatusError { .. } => "Retry the command; report it if it keeps failing",
            RpaasError::ConfigError { .. }
            | RpaasError::InvalidConfigValueError { .. }
            | RpaasError::MissingConfigError { .. } => "Fix the configuration file and try again",
            RpaasError::IoError(_) | RpaasError::StoreError(_) => {
                "Check the store path permissions and free disk space"
            }
            RpaasError::SerializationError(_) => "The server returned an unexpected payload",
        }
    }
}

pub type Result<T> = std::result::Result<T, RpaasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_embeds_name() {
        let err = ProvisionError::conflict("firstinstance");
        assert_eq!(err.to_string(), "firstinstance instance already exists");
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let config = RpaasError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(config.exit_code(), 1);

        let server = RpaasError::ApiStatusError {
            status: 502,
            message: String::new(),
        };
        assert_eq!(server.severity(), ErrorSeverity::Medium);
        assert_eq!(server.exit_code(), 2);

        let io = RpaasError::IoError(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 3);
    }

    #[test]
    fn test_every_failure_exits_nonzero() {
        let errors = vec![
            RpaasError::ApiStatusError {
                status: 404,
                message: String::new(),
            },
            RpaasError::ApiStatusError {
                status: 503,
                message: String::new(),
            },
            RpaasError::MissingConfigError {
                field: "api_url".to_string(),
            },
            RpaasError::StoreError(StoreError::Timeout(Duration::from_secs(1))),
        ];
        for err in errors {
            assert_ne!(err.exit_code(), 0, "{err}");
        }
    }

    #[test]
    fn test_user_friendly_message_prefers_server_text() {
        let err = RpaasError::ApiStatusError {
            status: 400,
            message: "instance not found".to_string(),
        };
        assert_eq!(err.user_friendly_message(), "instance not found");
    }
}
