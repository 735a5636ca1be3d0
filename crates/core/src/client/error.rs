use reqwest::StatusCode;
use std::fmt;

/// Non-success HTTP response from the stockdesk API.
#[derive(Debug, Clone)]
pub struct ServiceError {
    pub status: StatusCode,
    pub path: String,
    pub body: String,
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    pub fn is_retryable(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS || self.status.is_server_error()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stockdesk API HTTP {} for {}: {}", self.status, self.path, self.body)
    }
}

impl std::error::Error for ServiceError {}
