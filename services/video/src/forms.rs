//! Multipart form readers for the upload endpoints
//!
//! Every step of turning a request into a [`RecordedVideoDto`] has its own
//! [`FormError`] variant so the client learns which part was rejected.

use axum::extract::{Multipart, multipart::MultipartError};
use thiserror::Error;

use crate::models::{RecordedVideoDto, UploadedFile, VideoMode};

pub const EMPTY_FILE_MESSAGE: &str = "Uploaded file is empty.";

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Missing required part: {0}")]
    MissingPart(&'static str),

    #[error("Invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid videoMode: {0}")]
    InvalidMode(String),

    #[error("Invalid recordedAt, expected an ISO-8601 date-time: {0}")]
    InvalidTimestamp(String),

    #[error("{}", EMPTY_FILE_MESSAGE)]
    EmptyFile,
}

/// Raw parts of a `saveVideo` request
#[derive(Debug, Default)]
pub struct SaveVideoForm {
    pub file: Option<UploadedFile>,
    pub session_id: Option<String>,
    pub video_mode: Option<String>,
    pub recorded_at: Option<String>,
    pub duration: Option<String>,
}

impl SaveVideoForm {
    /// Drain the multipart stream, keeping the known parts
    pub async fn read(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = SaveVideoForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => form.file = Some(read_file(field).await?),
                "sessionId" => form.session_id = Some(field.text().await?),
                "videoMode" => form.video_mode = Some(field.text().await?),
                "recordedAt" => form.recorded_at = Some(field.text().await?),
                "duration" => form.duration = Some(field.text().await?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validate the parts and split them into the DTO and the file
    pub fn into_parts(self) -> Result<(RecordedVideoDto, UploadedFile), FormError> {
        let session_id = required(self.session_id, "sessionId")?;
        let session_id = session_id
            .trim()
            .parse::<i64>()
            .map_err(|_| FormError::InvalidNumber {
                field: "sessionId",
                value: session_id.clone(),
            })?;

        let video_mode = required(self.video_mode, "videoMode")?;
        let video_mode = video_mode
            .parse::<VideoMode>()
            .map_err(|_| FormError::InvalidMode(video_mode.clone()))?;

        let recorded_at = required(self.recorded_at, "recordedAt")?;
        let recorded_at = RecordedVideoDto::parse_recorded_at(&recorded_at)
            .map_err(|_| FormError::InvalidTimestamp(recorded_at.clone()))?;

        let duration = required(self.duration, "duration")?;
        let duration = duration
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|seconds| *seconds >= 0)
            .ok_or_else(|| FormError::InvalidNumber {
                field: "duration",
                value: duration.clone(),
            })?;

        let file = self.file.ok_or(FormError::MissingPart("file"))?;
        if file.is_empty() {
            return Err(FormError::EmptyFile);
        }

        let dto = RecordedVideoDto {
            session_id,
            video_mode,
            duration,
            recorded_at,
        };

        Ok((dto, file))
    }
}

/// Read the `file` part of an `edit` request; a missing part counts as empty
pub async fn read_edit_file(mut multipart: Multipart) -> Result<UploadedFile, FormError> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            file = Some(read_file(field).await?);
        }
    }

    match file {
        Some(file) if !file.is_empty() => Ok(file),
        _ => Err(FormError::EmptyFile),
    }
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<UploadedFile, FormError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;

    Ok(UploadedFile::new(file_name, content_type, bytes))
}

fn required(value: Option<String>, part: &'static str) -> Result<String, FormError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(FormError::MissingPart(part))
}
