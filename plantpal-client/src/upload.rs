//! Upload Controller
//!
//! Owns the selected image for the lifetime of one page session and turns it
//! into an [`IdentificationRequest`] on submit. At most one request may be in
//! flight; the submit control is disabled until [`UploadSession::complete`].

use plantpal_common::api::{DEFAULT_ORGAN, IMAGE_FIELD, ORGAN_FIELD};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::asset::ImageAsset;

pub const SELECT_IMAGE_FIRST: &str = "Please select an image first.";

/// Why a submit did not produce a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Nothing selected yet; shown to the user
    NoImage,
    /// A request is already awaiting its response; ignored
    InFlight,
}

/// One identification request, built fresh per submit
#[derive(Debug, Clone)]
pub struct IdentificationRequest {
    image: ImageAsset,
    organ: String,
}

impl IdentificationRequest {
    pub fn image(&self) -> &ImageAsset {
        &self.image
    }

    pub fn organ(&self) -> &str {
        &self.organ
    }

    /// Multipart payload: one binary field plus the classification hint
    pub fn into_form(self) -> Form {
        let file_name = self.image.file_name().to_string();
        let part = Part::bytes(self.image.bytes().to_vec()).file_name(file_name.clone());
        // detect_mime only yields well-formed type/subtype strings
        let part = match part.mime_str(self.image.mime_type()) {
            Ok(part) => part,
            Err(_) => Part::bytes(self.image.bytes().to_vec()).file_name(file_name),
        };

        Form::new()
            .part(IMAGE_FIELD, part)
            .text(ORGAN_FIELD, self.organ)
    }
}

/// Preview area content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub src: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

/// Upload area view: preview (hidden when `None`) and submit control state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub preview: Option<Preview>,
    pub submit_enabled: bool,
}

/// Upload Controller state
#[derive(Debug, Clone)]
pub struct UploadSession {
    selected: Option<ImageAsset>,
    in_flight: bool,
    organ: String,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new(DEFAULT_ORGAN)
    }
}

impl UploadSession {
    pub fn new(organ: impl Into<String>) -> Self {
        Self {
            selected: None,
            in_flight: false,
            organ: organ.into(),
        }
    }

    /// File input changed
    ///
    /// `None` (selection cancelled) leaves the session untouched.
    pub fn on_file_selected(&mut self, file: Option<ImageAsset>) {
        let Some(file) = file else {
            return;
        };

        debug!(
            file_name = file.file_name(),
            mime_type = file.mime_type(),
            bytes = file.len(),
            "Image selected"
        );
        self.selected = Some(file);
    }

    /// Submit pressed
    ///
    /// On success the session is in flight until [`complete`](Self::complete).
    pub fn on_submit(&mut self) -> Result<IdentificationRequest, SubmitRejection> {
        if self.in_flight {
            return Err(SubmitRejection::InFlight);
        }

        let image = self.selected.clone().ok_or(SubmitRejection::NoImage)?;
        self.in_flight = true;

        Ok(IdentificationRequest {
            image,
            organ: self.organ.clone(),
        })
    }

    /// The in-flight request finished, successfully or not
    pub fn complete(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn selected(&self) -> Option<&ImageAsset> {
        self.selected.as_ref()
    }

    pub fn view(&self) -> UploadView {
        UploadView {
            preview: self.selected.as_ref().map(|asset| Preview {
                src: asset.preview_url(),
                file_name: asset.file_name().to_string(),
                mime_type: asset.mime_type().to_string(),
                size_bytes: asset.len(),
            }),
            submit_enabled: !self.in_flight,
        }
    }
}
