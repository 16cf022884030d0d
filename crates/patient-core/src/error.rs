use thiserror::Error;

/// Errors raised while parsing core patient values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid gender: {0}")]
    InvalidGender(String),

    #[error("Invalid blood type: {0}")]
    InvalidBloodType(String),
}

impl CoreError {
    /// Create a new InvalidGender error
    pub fn invalid_gender(value: impl Into<String>) -> Self {
        Self::InvalidGender(value.into())
    }

    /// Create a new InvalidBloodType error
    pub fn invalid_blood_type(value: impl Into<String>) -> Self {
        Self::InvalidBloodType(value.into())
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CoreError::invalid_gender("OTHER").to_string(),
            "Invalid gender: OTHER"
        );
        assert_eq!(
            CoreError::invalid_blood_type("C+").to_string(),
            "Invalid blood type: C+"
        );
    }
}
