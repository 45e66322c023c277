//! Shared-secret access gate.

use imagery_common::ImageryError;
use serde::Deserialize;

/// Query parameters every gated endpoint accepts.
///
/// The token is optional at the extractor level so a missing value maps
/// to a 422 validation failure rather than a generic bad request.
#[derive(Debug, Deserialize)]
pub struct TokenParams {
    pub csrf_token: Option<String>,
}

/// Compare the caller-supplied token against the configured secret.
///
/// Runs before the upload is touched, so an invalid token short-circuits
/// any image processing.
pub fn check_token(secret: &str, provided: Option<&str>) -> Result<(), ImageryError> {
    match provided {
        None => Err(ImageryError::MissingParameter("csrf_token".into())),
        Some(token) if token == secret => Ok(()),
        Some(_) => Err(ImageryError::InvalidToken),
    }
}
