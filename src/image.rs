use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Extensions the upload endpoint accepts.
const SERVICE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A picked or captured image, ready to be uploaded once.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub uri: String,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(uri: impl Into<String>, bytes: Vec<u8>) -> Self {
        let uri = uri.into();
        let filename = filename_from_uri(&uri);
        let mime_type = infer_mime_type(&filename).to_string();

        Self {
            uri,
            filename,
            mime_type,
            bytes,
        }
    }

    /// Reads an image from disk, as left by the gallery picker or camera.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let uri = path.to_string_lossy().to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                Error::PermissionDenied(format!("cannot read image '{}'", uri))
            }
            ErrorKind::NotFound => Error::NoImageSelected,
            _ => Error::Io(e),
        })?;

        if bytes.is_empty() {
            return Err(Error::NoImageSelected);
        }

        let asset = Self::new(uri, bytes);
        debug!(
            "Acquired image '{}' ({}, {} bytes)",
            asset.filename,
            asset.mime_type,
            asset.bytes.len()
        );
        Ok(asset)
    }

    pub fn is_accepted_by_service(&self) -> bool {
        extension(&self.filename)
            .map(|ext| SERVICE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

pub fn infer_mime_type(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn filename_from_uri(uri: &str) -> String {
    match uri.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("image-{}.jpg", chrono::Utc::now().timestamp_millis()),
    }
}
