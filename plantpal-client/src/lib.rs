//! plantpal-client library - Upload, identify and display
//!
//! The client side of the identification pipeline:
//! - [`upload`]: the Upload Controller (file selection, preview, payload)
//! - [`transport`]: HTTP call to the relay
//! - [`render`]: the Result Renderer (response body to result view)
//! - [`view`]: the one adapter that writes views to an output surface
//! - [`auth`]: login/signup against the identity provider
//!
//! Controller and renderer are pure state → view functions; only
//! [`view::Surface`] implementations mutate output.

pub mod app;
pub mod asset;
pub mod auth;
pub mod collection;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod transport;
pub mod upload;
pub mod view;

pub use crate::app::PlantPalApp;
pub use crate::asset::ImageAsset;
pub use crate::error::{ClientError, ClientResult};
pub use crate::render::{render_body, render_reply, ResultView};
pub use crate::upload::{IdentificationRequest, UploadSession};
