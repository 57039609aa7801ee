use thiserror::Error;

/// Substrings the backend uses when a symbol cannot be resolved.
const NOT_FOUND_MARKERS: [&str; 3] = ["not found", "404", "does not exist"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Failure of a call to the dashboard REST backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Build an error from a non-2xx status and the backend's message, if any.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status));

        if status == 404 {
            ApiError::NotFound(message)
        } else {
            ApiError::Http { status, message }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 or for any error whose message reads like a missing symbol.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound(_) => true,
            ApiError::Http { status: 404, .. } => true,
            other => looks_like_not_found(&other.to_string()),
        }
    }
}

/// Message heuristic kept for backends that report a missing ticker with a 2xx/5xx.
pub fn looks_like_not_found(message: &str) -> bool {
    let lower = message.to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_backend_message() {
        let err = ApiError::from_status(500, Some("upstream timeout".to_string()));
        assert_eq!(err.to_string(), "upstream timeout");
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_from_status_generic_message() {
        let err = ApiError::from_status(502, Some("   ".to_string()));
        assert_eq!(err.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn test_404_is_not_found() {
        let err = ApiError::from_status(404, None);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_message_heuristic() {
        let err = ApiError::Http {
            status: 400,
            message: "Ticker XYZQ does not exist".to_string(),
        };
        assert!(err.is_not_found());
        assert!(looks_like_not_found("Symbol NOT FOUND"));
        assert!(!looks_like_not_found("rate limited"));
        assert!(!ApiError::Network("connection reset".to_string()).is_not_found());
    }
}
