use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoomError {
    #[error("Invalid {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Listing not found: {id}")]
    NotFound { id: String },

    #[error("Not allowed to {action} listing {id}")]
    Forbidden { action: String, id: String },

    #[error("Listing storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Upload of '{file_name}' failed: {message}")]
    UploadError { file_name: String, message: String },

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Authentication failed: {message}")]
    AuthError {
        message: String,
        status: Option<u16>,
        code: Option<String>,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Permission,
    Authentication,
    External,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RoomError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RoomError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(id: impl ToString) -> Self {
        RoomError::NotFound { id: id.to_string() }
    }

    pub fn forbidden(action: impl Into<String>, id: impl ToString) -> Self {
        RoomError::Forbidden {
            action: action.into(),
            id: id.to_string(),
        }
    }

    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        RoomError::StorageUnavailable {
            message: message.into(),
        }
    }

    pub fn upload(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        RoomError::UploadError {
            file_name: file_name.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RoomError::ValidationError { .. } => ErrorCategory::Validation,
            RoomError::NotFound { .. } => ErrorCategory::NotFound,
            RoomError::Forbidden { .. } => ErrorCategory::Permission,
            RoomError::Unauthenticated | RoomError::AuthError { .. } => {
                ErrorCategory::Authentication
            }
            RoomError::StorageUnavailable { .. }
            | RoomError::UploadError { .. }
            | RoomError::ApiError(_) => ErrorCategory::External,
            RoomError::ConfigError { .. }
            | RoomError::InvalidConfigValueError { .. }
            | RoomError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RoomError::IoError(_) | RoomError::SerializationError(_) | RoomError::CsvError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::External => ErrorSeverity::Medium,
            ErrorCategory::Permission | ErrorCategory::Authentication => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 外部服務失敗可由使用者重新提交；本層不會自動重試
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RoomError::StorageUnavailable { .. }
                | RoomError::UploadError { .. }
                | RoomError::ApiError(_)
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RoomError::ValidationError { field, message } => {
                format!("Please check the {} field: {}", field, message)
            }
            RoomError::NotFound { .. } => "That room listing could not be found.".to_string(),
            RoomError::Forbidden { .. } => {
                "You can only change listings that you created.".to_string()
            }
            RoomError::StorageUnavailable { .. } | RoomError::ApiError(_) => {
                "The listing service is unavailable right now. Please try again.".to_string()
            }
            RoomError::UploadError { file_name, .. } => {
                format!("Failed to upload '{}'. Please try again.", file_name)
            }
            RoomError::Unauthenticated => "Please log in to continue.".to_string(),
            RoomError::AuthError { message, .. } => message.clone(),
            RoomError::ConfigError { .. }
            | RoomError::InvalidConfigValueError { .. }
            | RoomError::MissingConfigError { .. } => {
                format!("Configuration problem: {}", self)
            }
            RoomError::IoError(_) | RoomError::SerializationError(_) | RoomError::CsvError(_) => {
                format!("Unexpected local error: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RoomError::ValidationError { .. } => "Correct the highlighted value and submit again".to_string(),
            RoomError::NotFound { .. } => "Search the listings again; it may have been deleted".to_string(),
            RoomError::Forbidden { .. } => "Sign in with the account that owns the listing".to_string(),
            RoomError::Unauthenticated => "Run `roomfinder login` first".to_string(),
            RoomError::AuthError { .. } => "Check your email and password".to_string(),
            RoomError::StorageUnavailable { .. } | RoomError::ApiError(_) => {
                "Check your network connection and the backend URL, then retry".to_string()
            }
            RoomError::UploadError { .. } => {
                "Check the image size and type, then resubmit the whole form".to_string()
            }
            RoomError::MissingConfigError { field } => {
                format!("Set `{}` in the config file or environment", field)
            }
            RoomError::ConfigError { .. } | RoomError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
            RoomError::IoError(_) | RoomError::SerializationError(_) | RoomError::CsvError(_) => {
                "Check file permissions and disk space".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RoomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_failures_are_retryable() {
        assert!(RoomError::storage_unavailable("connection refused").is_retryable());
        assert!(RoomError::upload("a.png", "quota").is_retryable());
        assert!(!RoomError::forbidden("delete", "x").is_retryable());
        assert!(!RoomError::validation("rent", "negative").is_retryable());
    }

    #[test]
    fn test_severity_follows_category() {
        assert_eq!(RoomError::not_found("1").severity(), ErrorSeverity::Low);
        assert_eq!(
            RoomError::storage_unavailable("down").severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(RoomError::Unauthenticated.severity(), ErrorSeverity::High);
        assert_eq!(
            RoomError::MissingConfigError {
                field: "backend.url".to_string()
            }
            .severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_display_includes_field() {
        let err = RoomError::validation("contact_number", "must be exactly 10 digits");
        assert_eq!(
            err.to_string(),
            "Invalid contact_number: must be exactly 10 digits"
        );
    }
}
