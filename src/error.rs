// Error taxonomy surfaced to callers of the flight API client

use thiserror::Error;

// Coarse tag for an ApiError, so callers can branch without matching payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    RateLimited,
    InvalidParameters,
    Unauthorized,
    Server,
    Transport,
    Provider,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Missing required airport information: {0}")]
    Validation(String),

    #[error("Could not find airport: {0}")]
    NotFound(String),

    #[error("API quota exceeded: {0}")]
    RateLimited(String),

    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),

    #[error("API authentication failed: {0}")]
    Unauthorized(String),

    #[error("Server error: {status_code} - {message}")]
    Server { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Provider(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Markers looked for (lowercased) in provider `message` fields, in priority order
const RATE_LIMIT_MARKERS: &[&str] = &["quota", "rate limit", "too many requests"];
const NOT_FOUND_MARKERS: &[&str] = &["could not find", "not found"];
const INVALID_MARKERS: &[&str] = &["invalid"];

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::RateLimited(_) => ErrorKind::RateLimited,
            ApiError::InvalidParameters(_) => ErrorKind::InvalidParameters,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Provider(_) => ErrorKind::Provider,
        }
    }

    // Classifies a non-success HTTP status. `message` is whatever the provider
    // put in the error body, or the canonical reason phrase.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            400 => ApiError::InvalidParameters(message),
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited(message),
            500..=599 => ApiError::Server {
                status_code,
                message,
            },
            _ => ApiError::Provider(message),
        }
    }

    // Classifies a `status: false` payload by its free-text message.
    pub fn from_provider_message(message: Option<&str>) -> Self {
        let Some(message) = message.map(str::trim).filter(|m| !m.is_empty()) else {
            return ApiError::Provider("Unknown API error".to_string());
        };

        let lowered = message.to_lowercase();
        let has_marker = |markers: &[&str]| markers.iter().any(|m| lowered.contains(m));

        if has_marker(RATE_LIMIT_MARKERS) {
            ApiError::RateLimited(message.to_string())
        } else if has_marker(NOT_FOUND_MARKERS) {
            ApiError::NotFound(message.to_string())
        } else if has_marker(INVALID_MARKERS) {
            ApiError::InvalidParameters(message.to_string())
        } else {
            ApiError::Provider(message.to_string())
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::Server | ErrorKind::Transport
        )
    }

    // Sentence suitable for showing to the person who ran the search
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(_) => {
                "Please select both departure and destination airports from the dropdown."
                    .to_string()
            }
            ApiError::NotFound(_) => {
                "Airport not found. Please select a valid airport from the dropdown.".to_string()
            }
            ApiError::RateLimited(_) => {
                "Daily search limit reached. Please try again tomorrow or contact support."
                    .to_string()
            }
            ApiError::InvalidParameters(_) => {
                "Invalid search parameters. Please check your airports and travel dates."
                    .to_string()
            }
            ApiError::Unauthorized(_) => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            ApiError::Server { .. } => {
                "Service temporarily unavailable. Please try again in a few minutes.".to_string()
            }
            ApiError::Transport(_) => {
                "Network error. Please check your internet connection and try again.".to_string()
            }
            ApiError::Provider(message) => {
                format!("Search failed: {}. Please try different search criteria.", message)
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport(format!("request timeout: {}", err))
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(400, ErrorKind::InvalidParameters ; "bad request")]
    #[test_case(401, ErrorKind::Unauthorized ; "unauthorized")]
    #[test_case(404, ErrorKind::NotFound ; "not found")]
    #[test_case(429, ErrorKind::RateLimited ; "too many requests")]
    #[test_case(500, ErrorKind::Server ; "internal error")]
    #[test_case(503, ErrorKind::Server ; "unavailable")]
    #[test_case(403, ErrorKind::Provider ; "forbidden is unclassified")]
    fn test_status_classification(status: u16, expected: ErrorKind) {
        assert_eq!(ApiError::from_status(status, "boom").kind(), expected);
    }

    #[test_case(Some("You have exceeded the MONTHLY quota"), ErrorKind::RateLimited ; "quota")]
    #[test_case(Some("Too many requests"), ErrorKind::RateLimited ; "too many")]
    #[test_case(Some("Could not find entity 123"), ErrorKind::NotFound ; "could not find")]
    #[test_case(Some("invalid date format"), ErrorKind::InvalidParameters ; "invalid")]
    #[test_case(Some("something odd happened"), ErrorKind::Provider ; "unclassified")]
    #[test_case(Some("   "), ErrorKind::Provider ; "blank")]
    #[test_case(None, ErrorKind::Provider ; "missing")]
    fn test_message_classification(message: Option<&str>, expected: ErrorKind) {
        assert_eq!(ApiError::from_provider_message(message).kind(), expected);
    }

    #[test]
    fn test_server_error_keeps_status() {
        let err = ApiError::from_status(502, "Bad Gateway");
        assert_eq!(
            err,
            ApiError::Server {
                status_code: 502,
                message: "Bad Gateway".to_string()
            }
        );
        assert_eq!(err.to_string(), "Server error: 502 - Bad Gateway");
    }

    #[test]
    fn test_retryable_split() {
        assert!(ApiError::RateLimited("q".into()).is_retryable());
        assert!(ApiError::Transport("t".into()).is_retryable());
        assert!(ApiError::from_status(500, "x").is_retryable());
        assert!(!ApiError::Validation("v".into()).is_retryable());
        assert!(!ApiError::InvalidParameters("i".into()).is_retryable());
    }

    #[test]
    fn test_user_messages_are_distinct_for_retry_and_input_errors() {
        let later = ApiError::RateLimited("q".into()).user_message();
        let input = ApiError::InvalidParameters("i".into()).user_message();
        assert_ne!(later, input);
        assert!(ApiError::Provider("Unknown route".into())
            .user_message()
            .contains("Unknown route"));
    }
}
