//! Recorded video models for the video service

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Recording context of a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoMode {
    Practice,
    Challenge,
    Accuracy,
}

impl VideoMode {
    /// Name used on the wire and in the `recorded_videos.video_mode` column
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoMode::Practice => "PRACTICE",
            VideoMode::Challenge => "CHALLENGE",
            VideoMode::Accuracy => "ACCURACY",
        }
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown video mode: {0}")]
pub struct UnknownVideoMode(pub String);

impl FromStr for VideoMode {
    type Err = UnknownVideoMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PRACTICE" => Ok(VideoMode::Practice),
            "CHALLENGE" => Ok(VideoMode::Challenge),
            "ACCURACY" => Ok(VideoMode::Accuracy),
            other => Err(UnknownVideoMode(other.to_string())),
        }
    }
}

/// Fields of an upload request handed to the service layer
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVideoDto {
    pub session_id: i64,
    pub video_mode: VideoMode,
    /// Length of the recording in seconds
    pub duration: i32,
    pub recorded_at: NaiveDateTime,
}

impl RecordedVideoDto {
    /// Parse an ISO-8601 `recordedAt` value.
    ///
    /// Local date-times (`2024-05-01T12:30:00`, optional fraction, or
    /// `2024-05-01T12:30` without seconds) are taken as-is; RFC 3339 values
    /// carrying an offset are normalized to UTC.
    pub fn parse_recorded_at(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        let value = value.trim();
        let local_err = match value.parse::<NaiveDateTime>() {
            Ok(local) => return Ok(local),
            Err(e) => e,
        };

        if let Ok(minutes) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
            return Ok(minutes);
        }

        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.naive_utc())
            .map_err(|_| local_err)
    }
}

/// Stored recorded video row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordedVideo {
    pub id: i64,
    pub username: String,
    pub session_id: i64,
    pub video_mode: VideoMode,
    pub video_key: String,
    pub video_url: String,
    pub duration: i32,
    pub recorded_at: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model returned by the lookup endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MyVideoResponse {
    pub id: i64,
    pub session_id: i64,
    pub video_mode: VideoMode,
    pub video_url: String,
    pub duration: i32,
    pub recorded_at: NaiveDateTime,
    pub created_at: DateTime<Utc>,
}

impl From<RecordedVideo> for MyVideoResponse {
    fn from(video: RecordedVideo) -> Self {
        Self {
            id: video.id,
            session_id: video.session_id,
            video_mode: video.video_mode,
            video_url: video.video_url,
            duration: video.duration,
            recorded_at: video.recorded_at,
            created_at: video.created_at,
        }
    }
}

/// Query parameters for `GET /recorded-video/user/me`
#[derive(Debug, Clone, Deserialize)]
pub struct MyVideosQuery {
    pub mode: Option<VideoMode>,
}

/// Query parameters for `GET /recorded-video/session`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVideosQuery {
    pub session_id: i64,
    pub mode: VideoMode,
}
