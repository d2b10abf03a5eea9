use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstateError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("User error: {message}")]
    UserError { message: String },

    #[error("Constraint '{constraint}' violated: {message}")]
    ConstraintError { constraint: String, message: String },

    #[error("Missing required field '{field}' on {model}")]
    MissingFieldError { model: String, field: String },

    #[error("{model} record {id} does not exist")]
    NotFoundError { model: String, id: u64 },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Business rule rejected the operation.
    Business,
    /// Record store refused the write.
    Storage,
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

impl EstateError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::UserError {
            message: message.into(),
        }
    }

    pub fn constraint(constraint: &str, message: impl Into<String>) -> Self {
        Self::ConstraintError {
            constraint: constraint.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(model: &str, id: u64) -> Self {
        Self::NotFoundError {
            model: model.to_string(),
            id,
        }
    }

    pub fn missing_field(model: &str, field: &str) -> Self {
        Self::MissingFieldError {
            model: model.to_string(),
            field: field.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::UserError { .. } => ErrorCategory::Business,
            Self::ConstraintError { .. }
            | Self::MissingFieldError { .. }
            | Self::NotFoundError { .. } => ErrorCategory::Storage,
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Business => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Message meant for the end user, without the variant prefix.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } | Self::UserError { message } => message.clone(),
            Self::ConstraintError { message, .. } => message.clone(),
            Self::MissingFieldError { model, field } => {
                format!("The field '{}' of {} is required", field, model)
            }
            Self::NotFoundError { model, id } => {
                format!("No {} with id {} was found", model, id)
            }
            Self::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            Self::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for '{}': {}", value, field, reason),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(e) => format!("Could not serialize output: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => {
                "Raise the selling price or lower the expected price before accepting offers"
            }
            Self::UserError { .. } => "Check the current state of the record before retrying",
            Self::ConstraintError { .. } => "Correct the offending value; names must be unique and prices positive",
            Self::MissingFieldError { .. } => "Fill in every required field",
            Self::NotFoundError { .. } => "List the records to find a valid id",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
            Self::IoError(_) => "Make sure the file exists and is readable",
            Self::SerializationError(_) => "Report this as a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, EstateError>;
