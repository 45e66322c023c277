//! HTTP mapping for request errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use imagery_common::ImageryError;

/// Wrapper giving [`ImageryError`] an HTTP response shape.
///
/// Handlers return `Result<_, ApiError>`; the `?` operator lifts
/// `ImageryError` through the `From` impl.
#[derive(Debug)]
pub struct ApiError(pub ImageryError);

/// Error body: `{"detail": "..."}`.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl From<ImageryError> for ApiError {
    fn from(err: ImageryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        (
            status,
            Json(ErrorBody {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let response = ApiError(ImageryError::InvalidToken).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ApiError(ImageryError::MalformedImage).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError(ImageryError::MissingParameter("csrf_token".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
