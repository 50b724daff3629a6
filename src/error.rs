use thiserror::Error;

/// Failures surfaced by the puush API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-zero status line. Carries the raw
    /// code and, when the code is a known one, its meaning.
    #[error("{}", status_message(.code, .description.as_deref()))]
    Status {
        code: String,
        description: Option<String>,
    },

    /// A response line did not split into the expected six fields.
    #[error("malformed history entry: {line:?}")]
    MalformedEntry { line: String },

    /// The HTTP request itself failed (network error, non-2xx response).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

fn status_message(code: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) => format!("api returned status {code}: {desc}"),
        None => format!("api returned status {code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_includes_description() {
        let err = ApiError::Status {
            code: "-3".to_string(),
            description: Some("Failure: Hash mismatch".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "api returned status -3: Failure: Hash mismatch"
        );
    }

    #[test]
    fn test_status_error_without_description() {
        let err = ApiError::Status {
            code: "-99".to_string(),
            description: None,
        };
        assert_eq!(err.to_string(), "api returned status -99");
    }

    #[test]
    fn test_malformed_entry_names_line() {
        let err = ApiError::MalformedEntry {
            line: "1,2,3".to_string(),
        };
        assert!(err.to_string().contains("1,2,3"));
    }
}
