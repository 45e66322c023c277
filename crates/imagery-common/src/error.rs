//! Error types for the imagery services.

use thiserror::Error;

/// Result type alias using ImageryError.
pub type ImageryResult<T> = Result<T, ImageryError>;

/// Primary error type for imagery request processing.
///
/// Display strings double as the client-facing `detail` message, so the
/// token and intake variants carry the exact wording the endpoints promise.
#[derive(Debug, Error)]
pub enum ImageryError {
    // === Request shape errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    // === Gate errors ===
    #[error("Unauthorised. Invalid CSRF Token.")]
    InvalidToken,

    // === Intake errors ===
    #[error("Malformed. Could not open image.")]
    MalformedImage,

    // === Processing errors ===
    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ImageryError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ImageryError::MissingParameter(_) => 422,
            ImageryError::InvalidToken => 403,
            ImageryError::MalformedImage => 400,
            ImageryError::DataReadError(_)
            | ImageryError::RenderError(_)
            | ImageryError::InternalError(_) => 500,
        }
    }
}

impl From<std::io::Error> for ImageryError {
    fn from(err: std::io::Error) -> Self {
        ImageryError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for ImageryError {
    fn from(err: serde_json::Error) -> Self {
        ImageryError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ImageryError::MissingParameter("csrf_token".into()).http_status_code(),
            422
        );
        assert_eq!(ImageryError::InvalidToken.http_status_code(), 403);
        assert_eq!(ImageryError::MalformedImage.http_status_code(), 400);
        assert_eq!(
            ImageryError::DataReadError("band 8".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_fixed_messages() {
        // These strings are part of the endpoint contract.
        assert_eq!(
            ImageryError::InvalidToken.to_string(),
            "Unauthorised. Invalid CSRF Token."
        );
        assert_eq!(
            ImageryError::MalformedImage.to_string(),
            "Malformed. Could not open image."
        );
    }
}
