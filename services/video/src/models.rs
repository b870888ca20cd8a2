//! API models for request and response payloads

pub mod upload;
pub mod video;

pub use upload::UploadedFile;
pub use video::{
    MyVideoResponse, MyVideosQuery, RecordedVideo, RecordedVideoDto, SessionVideosQuery, VideoMode,
};
