//! Request and response payloads of the pose evaluation service

use serde::{Deserialize, Serialize};

use crate::keypoints::{Feedback, Keypoint};

/// Body of `POST /analyze`
///
/// `keypoints` holds the landmarks detected in the dancer's frame; an empty
/// list means no pose was detected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub song_title: Option<String>,
    pub session_id: Option<i64>,
    pub frame_index: i64,
    pub keypoints: Option<Vec<Keypoint>>,
}

/// Score of one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub score: f64,
    pub feedback: Feedback,
    pub frame_index: i64,
}
