//! HTTP request handlers.

pub mod attributes;
pub mod health;
pub mod ndvi;
pub mod thumbnails;

use axum::http::{header, StatusCode};
use axum::response::Response;

/// Wrap encoded PNG bytes in an `image/png` response.
pub(crate) fn png_response(png: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .body(png.into())
        .unwrap()
}
