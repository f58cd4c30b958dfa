// Error handling module
// Defines the client-side error taxonomy

use thiserror::Error;

/// Errors that can occur while talking to the pizza service or the
/// authorization server
#[derive(Error, Debug)]
pub enum ApiError {
    /// Token exchange or refresh failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Request ended in 401 and the single-shot recovery is exhausted
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Error response from the pizza API
    #[error("Pizza API error: {status} - {message}")]
    PizzaApiError { status: u16, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ApiError::AuthError("Invalid refresh token".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: Invalid refresh token"
        );

        let err = ApiError::Unauthorized("GET /api/pizzas returned 401".to_string());
        assert_eq!(err.to_string(), "Unauthorized: GET /api/pizzas returned 401");

        let err = ApiError::PizzaApiError {
            status: 503,
            message: "Service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Pizza API error: 503 - Service unavailable");
    }

    #[test]
    fn test_internal_error_message() {
        let err = ApiError::Internal(anyhow::anyhow!("Something went wrong"));
        assert_eq!(err.to_string(), "Internal error: Something went wrong");
    }
}
