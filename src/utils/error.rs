use serde::Serialize;
use thiserror::Error;

/// One field that did not meet its constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Every violation found in a submission, in rule order.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record at line {line}: {message}")]
    Corrupt { line: usize, message: String },

    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Storage,
    Network,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigValidationError { .. } | AppError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            AppError::Store(_) => ErrorCategory::Storage,
            AppError::IoError(_) | AppError::ServerError { .. } => ErrorCategory::Network,
            AppError::CsvError(_) => ErrorCategory::Export,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::ConfigValidationError { .. } | AppError::InvalidConfigValueError { .. } => {
                ErrorSeverity::High
            }
            AppError::Store(StoreError::Unavailable { .. }) => ErrorSeverity::Medium,
            AppError::Store(_) | AppError::CsvError(_) => ErrorSeverity::High,
            AppError::IoError(_) | AppError::ServerError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::ConfigValidationError { field, .. } => {
                format!("The configuration could not be loaded ({field})")
            }
            AppError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{field}': {reason}")
            }
            AppError::Store(_) => "The message store could not be read or written".to_string(),
            AppError::IoError(_) => "A file or network operation failed".to_string(),
            AppError::CsvError(_) => "Writing the CSV export failed".to_string(),
            AppError::ServerError { message } => format!("The server stopped: {message}"),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML file and the command line overrides",
            ErrorCategory::Storage => "Check that the data file exists and is writable",
            ErrorCategory::Network => "Check that the bind address is free and reachable",
            ErrorCategory::Export => "Check that the output directory is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_serialize_as_plain_list() {
        let errors = ValidationErrors(vec![ValidationError::new("name", "too short")]);
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"field": "name", "reason": "too short"}])
        );
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = AppError::InvalidConfigValueError {
            field: "server.bind".to_string(),
            value: "nope".to_string(),
            reason: "not a socket address".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("server.bind"));
    }

    #[test]
    fn test_unavailable_store_is_retryable() {
        let err = AppError::from(StoreError::Unavailable {
            reason: "disk detached".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
