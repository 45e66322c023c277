//! Raster attributes endpoint.

use std::sync::Arc;

use axum::extract::{Extension, Multipart, Query};
use axum::Json;
use serde::Serialize;
use tracing::instrument;

use imagery_common::RasterBounds;

use crate::error::ApiError;
use crate::gate::{check_token, TokenParams};
use crate::intake::open_upload;
use crate::state::AppState;

/// Reported when the file carries no CRS geo keys; keeps the five-field
/// document intact for bare TIFFs.
const UNKNOWN_CRS: &str = "unknown";

/// The attributes document: exactly these five fields.
#[derive(Debug, Serialize)]
pub struct AttributesResponse {
    pub width: usize,
    pub height: usize,
    pub bands: usize,
    pub crs: String,
    pub bounds: RasterBounds,
}

/// POST /attributes/ - basic metadata of an uploaded raster.
#[instrument(skip_all)]
pub async fn attributes_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<TokenParams>,
    multipart: Multipart,
) -> Result<Json<AttributesResponse>, ApiError> {
    check_token(&state.token_secret, params.csrf_token.as_deref())?;
    let raster = open_upload(multipart).await?;

    Ok(Json(AttributesResponse {
        width: raster.width(),
        height: raster.height(),
        bands: raster.band_count(),
        crs: raster.crs().unwrap_or_else(|| UNKNOWN_CRS.to_string()),
        bounds: raster.bounds(),
    }))
}
