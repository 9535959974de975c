/// Core recommendation errors
///
/// The taxonomy separates load-time misconfiguration (fatal, prevents
/// serving) from per-request validation, lookup misses, and per-candidate
/// model failures. "No results" is a valid empty list, never an error;
/// the one deliberate exception is a user with zero rating records, which
/// is surfaced as `NotFound` so callers can distinguish "no history" from
/// "no matches".
#[derive(thiserror::Error, Debug)]
pub enum RecError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Model inference error: {0}")]
    ModelInference(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type RecResult<T> = Result<T, RecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = RecError::InvalidInput("top_k must be between 1 and 50".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: top_k must be between 1 and 50"
        );

        let err = RecError::NotFound("no rating history for user 42".to_string());
        assert!(err.to_string().contains("user 42"));
    }
}
