use thiserror::Error;

/// Anything that stops a completion from turning into a usable plan or
/// detail record. The user sees one generic retry message for all of them.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from completion service")]
    EmptyResponse,

    #[error("Invalid data structure")]
    InvalidStructure,

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_structure_message() {
        assert_eq!(
            GenerationError::InvalidStructure.to_string(),
            "Invalid data structure"
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let err: GenerationError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, GenerationError::Parse(_)));
    }
}
