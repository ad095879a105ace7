//! Identification relay endpoint
//!
//! POST /identify-plants accepts one image as multipart/form-data and relays
//! it upstream. The reply status and body are returned unchanged; the relay
//! does not interpret identification results.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plantpal_common::api::IMAGE_FIELD;
use tracing::{info, instrument};

use crate::error::{RelayError, RelayResult};
use crate::upstream::ImageUpload;
use crate::AppState;

/// POST /identify-plants
///
/// **Request:** multipart/form-data with one file part (field `image`)
/// **Response:** upstream status + raw upstream body
///
/// **Errors:**
/// - 400 Bad Request: body is not multipart or holds no image part
/// - 413 Payload Too Large: body exceeds the configured limit
/// - 500 Internal Server Error: upstream unreachable or timed out
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn relay_identify(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> RelayResult<Response> {
    let multipart = multipart.map_err(|rejection| RelayError::NoImage(Some(rejection.body_text())))?;

    let image = extract_image(multipart).await?;
    info!(
        file_name = %image.file_name,
        bytes = image.bytes.len(),
        "Image received"
    );

    let reply = state.upstream.forward(image).await?;
    Ok(reply.into_response())
}

/// Pull the first image part out of the request
///
/// A part counts as the image when it carries a file name or is named
/// `image`. Empty parts are skipped. Other parts are ignored.
async fn extract_image(mut multipart: Multipart) -> RelayResult<ImageUpload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_image = field.file_name().is_some() || field.name() == Some(IMAGE_FIELD);
        if !is_image {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.is_empty() {
            continue;
        }

        return Ok(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(RelayError::NoImage(None))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> RelayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::TooLarge(err.body_text())
    } else {
        RelayError::NoImage(Some(err.body_text()))
    }
}
