//! Repositories for database operations

use common::error::DatabaseResult;
use futures::future::BoxFuture;

use crate::models::{RecordedVideo, VideoMode};

pub mod video;

pub use video::{NewRecordedVideo, VideoRepository};

/// Persistence of recorded video rows
///
/// Listings are ordered newest recording first, ties broken by descending ID.
pub trait VideoRecords: Send + Sync {
    fn find_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, DatabaseResult<Vec<RecordedVideo>>>;

    fn find_by_username_and_mode<'a>(
        &'a self,
        username: &'a str,
        mode: VideoMode,
    ) -> BoxFuture<'a, DatabaseResult<Vec<RecordedVideo>>>;

    fn find_by_id(&self, id: i64) -> BoxFuture<'_, DatabaseResult<Option<RecordedVideo>>>;

    fn find_by_session_and_mode(
        &self,
        session_id: i64,
        mode: VideoMode,
    ) -> BoxFuture<'_, DatabaseResult<Vec<RecordedVideo>>>;

    /// Insert a new row and return it with its generated ID
    fn insert<'a>(
        &'a self,
        video: &'a NewRecordedVideo,
    ) -> BoxFuture<'a, DatabaseResult<RecordedVideo>>;

    /// Point an existing row at a newly uploaded object, `None` when the row is gone
    fn update_file<'a>(
        &'a self,
        id: i64,
        video_key: &'a str,
        video_url: &'a str,
    ) -> BoxFuture<'a, DatabaseResult<Option<RecordedVideo>>>;
}
