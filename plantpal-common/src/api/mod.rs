//! Shared HTTP API contract between the client and the relay
//!
//! Both sides must agree on the route, the multipart field names and the
//! shape of locally synthesized error bodies. Nothing here knows about the
//! upstream match schema: the relay never looks inside match content.

pub mod types;

pub use types::{
    ErrorBody, DEFAULT_ORGAN, DEFAULT_RELAY_PORT, IMAGE_FIELD, NO_IMAGE_ERROR, ORGAN_FIELD,
    RELAY_PATH, UPSTREAM_IMAGE_FIELD,
};
