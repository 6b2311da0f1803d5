use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid {field}: {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}

impl DomainError {
    /// Build a validation error for one request field.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
