//! Upload intake: multipart field to opened raster.

use axum::extract::Multipart;
use geotiff_parser::Dataset;
use imagery_common::ImageryError;

/// Multipart field name the endpoints accept the upload under.
const IMAGE_FIELD: &str = "image";

/// Pull the `image` field out of a multipart body and open it as a raster.
///
/// A missing field is a request-shape problem (422); bytes that do not
/// decode are the client's malformed-image error (400). The underlying
/// parser error is logged, never surfaced.
pub async fn open_upload(mut multipart: Multipart) -> Result<Dataset, ImageryError> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        tracing::warn!(%err, "failed to read multipart body");
        ImageryError::MalformedImage
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let data = field.bytes().await.map_err(|err| {
            tracing::warn!(%err, "failed to read upload bytes");
            ImageryError::MalformedImage
        })?;

        return Dataset::from_bytes(data).map_err(|err| {
            tracing::warn!(%err, "could not open upload as a raster");
            ImageryError::MalformedImage
        });
    }

    Err(ImageryError::MissingParameter(IMAGE_FIELD.into()))
}
