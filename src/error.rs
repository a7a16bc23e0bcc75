use thiserror::Error;

/// One or more input parameters failed their precondition checks.
///
/// Every violated rule is reported, not just the first one found.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parameter validation failed: {}", .messages.join("; "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Turns a collected message list into a result: empty means valid.
    pub fn check(messages: Vec<String>) -> Result<(), ValidationError> {
        if messages.is_empty() {
            Ok(())
        } else {
            Err(Self::new(messages))
        }
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages.iter().any(|m| m == message)
    }
}

#[derive(Error, Debug)]
pub enum PkpdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type PkpdResult<T> = Result<T, PkpdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_empty_is_ok() {
        assert!(ValidationError::check(Vec::new()).is_ok());
    }

    #[test]
    fn test_display_joins_messages() {
        let err = ValidationError::new(vec![
            "Half-life must be positive".to_string(),
            "Max concentration must be positive".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Parameter validation failed: Half-life must be positive; Max concentration must be positive"
        );
        assert!(err.contains("Half-life must be positive"));
    }
}
