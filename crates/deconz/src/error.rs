use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Gateway refused request (type {kind}): {description}")]
    Response { kind: u32, description: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid host: {0}")]
    InvalidHost(String),
}

impl ApiError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "Network error. Check that the gateway is reachable.",
            ApiError::Timeout(_) => "Request timed out. Please try again.",
            ApiError::Response { .. } => {
                "The gateway refused the request. Unlock it in Phoscon and try again."
            }
            ApiError::InvalidResponse(_) => "The gateway sent an unexpected reply.",
            ApiError::InvalidHost(_) => "Invalid host or port.",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::Timeout(_) | ApiError::Response { .. }
        )
    }

    /// True when the gateway answered and explicitly refused.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Response { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        // request URLs carry the API key in their path
        let e = e.without_url();
        if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Network(e)
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
