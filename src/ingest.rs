//! Image ingestion: validate an uploaded file and turn it into a
//! self-contained data URI.
//!
//! Checks run in a fixed order (content type, then declared size) and both
//! happen before any bytes are read. A rejected file never touches the card.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;

use crate::{Error, Result};

/// Upload ceiling in bytes (5 MiB). A file of exactly this size is accepted.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Extensions the file picker offers.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "webp", "gif"];

const BASE64_MARKER: &str = ";base64,";

/// A complete, self-contained image reference (`data:<mime>;base64,<payload>`).
///
/// Cloning is cheap; the URI text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbeddableImage {
    data_uri: Arc<str>,
    marker_at: usize,
}

impl EmbeddableImage {
    /// Encode raw bytes under the given MIME type. Parameters after `;` are
    /// dropped so the URI always parses back to the same media type.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let mime_type = match mime_type.split(';').next().map(str::trim) {
            Some(essence) if !essence.is_empty() && !essence.contains(',') => essence,
            _ => "application/octet-stream",
        };
        let data_uri = format!("data:{}{}{}", mime_type, BASE64_MARKER, STANDARD.encode(bytes));
        Self {
            marker_at: 5 + mime_type.len(),
            data_uri: data_uri.into(),
        }
    }

    /// Parse and validate an existing data URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidImage("not a data URI".into()))?;
        let marker = rest
            .find(BASE64_MARKER)
            .ok_or_else(|| Error::InvalidImage("data URI is not base64 encoded".into()))?;
        if marker == 0 {
            return Err(Error::InvalidImage("data URI has no media type".into()));
        }
        let payload = &rest[marker + BASE64_MARKER.len()..];
        STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidImage(format!("bad base64 payload: {}", e)))?;
        Ok(Self {
            data_uri: uri.into(),
            marker_at: 5 + marker,
        })
    }

    pub fn as_data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn mime_type(&self) -> &str {
        &self.data_uri[5..self.marker_at]
    }

    /// Decode the payload back into the original file bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        let payload = &self.data_uri[self.marker_at + BASE64_MARKER.len()..];
        STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidImage(format!("bad base64 payload: {}", e)))
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    Memory(Arc<[u8]>),
    Disk(PathBuf),
}

/// A file handed over by the picker: declared type and size plus a way to
/// read its bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    source: FileSource,
}

impl UploadedFile {
    /// A file whose bytes are already in memory. The declared size is the
    /// byte length.
    pub fn from_bytes(file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes.into()),
        }
    }

    /// Describe a file on disk. The MIME type comes from the extension and
    /// the size from file metadata, as a browser file picker reports them.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::ReadFailed(format!("{}: {}", path.display(), e)))?;
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension)
            .unwrap_or("application/octet-stream");
        Ok(Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type: mime_type.to_string(),
            size: meta.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    /// Override the declared size (pickers report it independently of the read).
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
            FileSource::Disk(path) => tokio::fs::read(path)
                .await
                .map_err(|e| Error::ReadFailed(format!("{}: {}", path.display(), e))),
        }
    }
}

/// MIME type for one of the accepted extensions (case-insensitive).
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Whether the picker would offer this path.
pub fn accepts_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Ingest with the default 5 MiB ceiling.
pub async fn ingest(file: &UploadedFile) -> Result<EmbeddableImage> {
    ingest_with_limit(file, MAX_UPLOAD_BYTES).await
}

/// Validate `file` and re-encode it as an [`EmbeddableImage`].
///
/// Resolves once: either a complete image or a rejection.
pub async fn ingest_with_limit(file: &UploadedFile, max_bytes: u64) -> Result<EmbeddableImage> {
    if !file.mime_type.to_ascii_lowercase().starts_with("image/") {
        return Err(Error::InvalidType(file.mime_type.clone()));
    }
    if file.size > max_bytes {
        return Err(Error::TooLarge {
            size: file.size,
            limit: max_bytes,
        });
    }

    let bytes = file.read().await?;
    debug!(
        "ingested {:?} ({}, {} bytes)",
        file.file_name,
        file.mime_type,
        bytes.len()
    );
    Ok(EmbeddableImage::from_bytes(&file.mime_type, &bytes))
}
