//! Selected image file
//!
//! An [`ImageAsset`] is the bytes of one picked file plus its name and MIME
//! type. The MIME type comes from the file's magic bytes when recognizable,
//! otherwise from its extension.

use base64::{engine::general_purpose, Engine as _};
use std::path::Path;
use std::sync::Arc;

use crate::error::{ClientError, ClientResult};

const FALLBACK_MIME: &str = "application/octet-stream";

/// In-memory image selected by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageAsset {
    /// Build an asset from bytes already in memory
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = detect_mime(&file_name, &bytes);
        Self {
            file_name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    /// Read an asset from disk
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(ClientError::Validation(format!(
                "{} is empty",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Local preview URL built straight from the bytes (no network)
    pub fn preview_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

fn detect_mime(file_name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let mime = match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("bmp") => "image/bmp",
        _ => FALLBACK_MIME,
    };
    mime.to_string()
}
