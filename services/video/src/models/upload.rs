//! Uploaded file payload read from multipart requests

use axum::body::Bytes;

const FALLBACK_EXTENSION: &str = "bin";

/// A file part received in a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: Option<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.filter(|name| !name.is_empty()),
            content_type: content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            bytes,
        }
    }

    /// True when no bytes were received
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Extension used for the stored object.
    ///
    /// Taken from the file name when it has a usable one, then from the
    /// content type, falling back to `bin`.
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| is_safe_extension(ext));

        from_name.unwrap_or_else(|| extension_for_content_type(&self.content_type).to_string())
    }
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

fn extension_for_content_type(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "video/x-matroska" => "mkv",
        "video/x-msvideo" => "avi",
        _ => FALLBACK_EXTENSION,
    }
}
