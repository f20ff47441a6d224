use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("Missing input document for service '{service}': {path}")]
    MissingInputDocument { service: String, path: String },

    #[error("Malformed reference at {location}: {reason}")]
    MalformedReference { location: String, reason: String },

    #[error("Unresolved schema references: {}", references.join(", "))]
    DanglingReferences { references: Vec<String> },

    #[error("Invalid document at {location}: {reason}")]
    InvalidDocument { location: String, reason: String },

    #[error("Missing field '{field}' at {location}")]
    MissingField { location: String, field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Stage '{stage}' failed: {details}")]
    StageError { stage: String, details: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Document,
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

impl ErrorSeverity {
    /// 命令列工具的結束代碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 參照不完整
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl CombineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CombineError::MissingInputDocument { .. } => ErrorCategory::Input,
            CombineError::MalformedReference { .. }
            | CombineError::DanglingReferences { .. }
            | CombineError::InvalidDocument { .. }
            | CombineError::MissingField { .. }
            | CombineError::SerializationError(_) => ErrorCategory::Document,
            CombineError::ConfigError { .. }
            | CombineError::ConfigValidationError { .. }
            | CombineError::InvalidConfigValueError { .. }
            | CombineError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CombineError::IoError(_) | CombineError::StageError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CombineError::DanglingReferences { .. } => ErrorSeverity::Medium,
            CombineError::IoError(_) => ErrorSeverity::Critical,
            CombineError::StageError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CombineError::MissingInputDocument { service, .. } => format!(
                "Fetch the OpenAPI document for '{}' before combining; every configured service needs one file",
                service
            ),
            CombineError::MalformedReference { .. } | CombineError::DanglingReferences { .. } => {
                "Check the upstream service documents for $ref pointers to missing schemas, or disable strict reference checking".to_string()
            }
            CombineError::InvalidDocument { .. } | CombineError::MissingField { .. } => {
                "Regenerate the offending service document; it does not have the expected OpenAPI shape".to_string()
            }
            CombineError::SerializationError(_) => {
                "Make sure every input file is valid JSON".to_string()
            }
            CombineError::ConfigError { .. }
            | CombineError::ConfigValidationError { .. }
            | CombineError::InvalidConfigValueError { .. }
            | CombineError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            CombineError::IoError(_) => {
                "Check file permissions and that the input/output directories are reachable".to_string()
            }
            CombineError::StageError { stage, .. } => {
                format!("Re-run with --verbose to see why stage '{}' failed", stage)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CombineError::MissingInputDocument { service, path } => {
                format!("Service '{}' has no downloaded spec at {}", service, path)
            }
            CombineError::DanglingReferences { references } => format!(
                "The combined spec would contain {} unresolved reference(s)",
                references.len()
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CombineError>;
