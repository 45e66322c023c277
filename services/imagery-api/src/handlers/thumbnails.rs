//! RGB thumbnail endpoint.

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

/// Bands composing the true-color thumbnail (1-based: red, green, blue).
const RGB_BANDS: [usize; 3] = [4, 3, 2];

/// Fixed output edge in pixels. The resample ignores the source aspect
/// ratio and geographic extent.
const THUMBNAIL_SIZE: usize = 256;

/// POST /thumbnails/ - 256x256 RGB rendering of an uploaded raster.
///
/// Each band is brightened and min-max normalized independently before
/// the three are stacked and resampled.
#[instrument(skip_all)]
pub async fn thumbnails_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<TokenParams>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    check_token(&state.token_secret, params.csrf_token.as_deref())?;
    let raster = open_upload(multipart).await?;
    let (width, height) = (raster.width(), raster.height());

    let mut channels = Vec::with_capacity(RGB_BANDS.len());
    for band in RGB_BANDS {
        let data = raster
            .read_band(band)
            .map_err(|err| ImageryError::DataReadError(err.to_string()))?;
        let channel = grid::normalize(&grid::brighten(&data));
        channels.push(grid::resample_grid(
            &channel,
            width,
            height,
            THUMBNAIL_SIZE,
            THUMBNAIL_SIZE,
        ));
    }

    let pixels = gradient::compose_rgb(&channels[0], &channels[1], &channels[2]);
    let encoded = png::encode_rgb(&pixels, THUMBNAIL_SIZE, THUMBNAIL_SIZE)
        .map_err(ImageryError::RenderError)?;

    Ok(png_response(encoded))
}
