//! Vegetation index (NDVI) endpoint.

use std::sync::Arc;

use axum::extract::{Extension, Multipart, Query};
use axum::response::Response;
use tracing::instrument;

use imagery_common::ImageryError;
use renderer::{gradient, grid, png};

use crate::error::ApiError;
use crate::gate::{check_token, TokenParams};
use crate::intake::open_upload;
use crate::state::AppState;

use super::png_response;

/// Reflectance pair for the index (1-based): visible red and near-infrared.
const RED_BAND: usize = 4;
const NIR_BAND: usize = 8;

/// Fixed output edge in pixels.
const INDEX_SIZE: usize = 1024;

/// POST /ndvi/ - 1024x1024 color-mapped vegetation index.
///
/// Both bands are min-max normalized, the per-pixel ratio
/// `(nir - red) / (nir + red)` is computed at native resolution, then
/// resampled and pushed through the diverging red-yellow-green scale.
#[instrument(skip_all)]
pub async fn ndvi_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<TokenParams>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    check_token(&state.token_secret, params.csrf_token.as_deref())?;
    let raster = open_upload(multipart).await?;
    let (width, height) = (raster.width(), raster.height());

    let red = read_normalized(&raster, RED_BAND)?;
    let nir = read_normalized(&raster, NIR_BAND)?;

    let index = grid::normalized_difference(&nir, &red);
    let resampled = grid::resample_grid(&index, width, height, INDEX_SIZE, INDEX_SIZE);

    let pixels = gradient::render_index(&resampled, INDEX_SIZE, INDEX_SIZE);
    let encoded =
        png::encode_rgba(&pixels, INDEX_SIZE, INDEX_SIZE).map_err(ImageryError::RenderError)?;

    Ok(png_response(encoded))
}

fn read_normalized(raster: &geotiff_parser::Dataset, band: usize) -> Result<Vec<f32>, ApiError> {
    let data = raster
        .read_band(band)
        .map_err(|err| ImageryError::DataReadError(err.to_string()))?;
    Ok(grid::normalize(&data))
}
