//! Video service used by the HTTP handlers
//!
//! [`VideoService`] is the seam between the routes and persistence.
//! [`RecordedVideoService`] coordinates a [`VideoRecords`] row store and an
//! [`ObjectStore`]; in production those are PostgreSQL and S3.

use common::error::DatabaseError;
use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    models::{MyVideoResponse, RecordedVideo, RecordedVideoDto, UploadedFile, VideoMode},
    repositories::{NewRecordedVideo, VideoRecords, VideoRepository},
    storage::{ObjectStore, StorageError, VideoStorage},
};

#[cfg(test)]
pub(crate) mod memory;

#[derive(Error, Debug)]
pub enum VideoServiceError {
    #[error("Video not found with ID: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub type ServiceResult<T> = Result<T, VideoServiceError>;

pub trait VideoService: Send + Sync {
    /// All videos of a user
    fn list_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Vec<MyVideoResponse>>>;

    /// Videos of a user recorded in one mode
    fn list_by_mode_and_username<'a>(
        &'a self,
        username: &'a str,
        mode: VideoMode,
    ) -> BoxFuture<'a, ServiceResult<Vec<MyVideoResponse>>>;

    /// A single video, `None` when no row has this ID
    fn get_by_id(&self, id: i64) -> BoxFuture<'_, ServiceResult<Option<MyVideoResponse>>>;

    fn list_by_session_and_mode(
        &self,
        session_id: i64,
        mode: VideoMode,
    ) -> BoxFuture<'_, ServiceResult<Vec<MyVideoResponse>>>;

    /// Store the file and record it under `username`
    fn save_recorded_video<'a>(
        &'a self,
        dto: RecordedVideoDto,
        file: UploadedFile,
        username: &'a str,
    ) -> BoxFuture<'a, ServiceResult<RecordedVideo>>;

    /// Replace the file of an existing video
    fn edit_video(&self, id: i64, file: UploadedFile) -> BoxFuture<'_, ServiceResult<RecordedVideo>>;
}

/// [`VideoService`] over a row store and an object store
#[derive(Clone)]
pub struct RecordedVideoService<R = VideoRepository, S = VideoStorage> {
    repository: R,
    storage: S,
}

impl<R: VideoRecords, S: ObjectStore> RecordedVideoService<R, S> {
    pub fn new(repository: R, storage: S) -> Self {
        Self {
            repository,
            storage,
        }
    }

    #[cfg(test)]
    pub(crate) fn repository(&self) -> &R {
        &self.repository
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }

    /// Remove an object no row points at
    async fn discard(&self, key: &str) {
        if let Err(cleanup) = self.storage.delete(key).await {
            error!("Failed to remove orphaned upload: {}", cleanup);
        }
    }

    async fn save(
        &self,
        dto: RecordedVideoDto,
        file: UploadedFile,
        username: &str,
    ) -> ServiceResult<RecordedVideo> {
        let video_key = self.storage.object_key(username, dto.session_id, &file);
        self.storage.upload(&video_key, &file).await?;

        let new_video = NewRecordedVideo {
            username: username.to_string(),
            session_id: dto.session_id,
            video_mode: dto.video_mode,
            video_url: self.storage.public_url(&video_key),
            video_key,
            duration: dto.duration,
            recorded_at: dto.recorded_at,
        };

        match self.repository.insert(&new_video).await {
            Ok(video) => {
                info!(
                    "Saved video {} for {} (session {}, {})",
                    video.id, username, video.session_id, video.video_mode
                );
                Ok(video)
            }
            Err(e) => {
                self.discard(&new_video.video_key).await;
                Err(e.into())
            }
        }
    }

    async fn edit(&self, id: i64, file: UploadedFile) -> ServiceResult<RecordedVideo> {
        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(VideoServiceError::NotFound(id))?;

        let video_key = self
            .storage
            .object_key(&existing.username, existing.session_id, &file);
        self.storage.upload(&video_key, &file).await?;

        let video_url = self.storage.public_url(&video_key);
        let updated = match self.repository.update_file(id, &video_key, &video_url).await {
            Ok(Some(video)) => video,
            Ok(None) => {
                self.discard(&video_key).await;
                return Err(VideoServiceError::NotFound(id));
            }
            Err(e) => {
                self.discard(&video_key).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.storage.delete(&existing.video_key).await {
            warn!("Previous file of video {} was not removed: {}", id, e);
        }

        info!("Replaced file of video {} ({} bytes)", id, file.len());
        Ok(updated)
    }
}

fn to_responses(videos: Vec<RecordedVideo>) -> Vec<MyVideoResponse> {
    videos.into_iter().map(MyVideoResponse::from).collect()
}

impl<R: VideoRecords, S: ObjectStore> VideoService for RecordedVideoService<R, S> {
    fn list_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Vec<MyVideoResponse>>> {
        async move {
            let videos = self.repository.find_by_username(username).await?;
            Ok(to_responses(videos))
        }
        .boxed()
    }

    fn list_by_mode_and_username<'a>(
        &'a self,
        username: &'a str,
        mode: VideoMode,
    ) -> BoxFuture<'a, ServiceResult<Vec<MyVideoResponse>>> {
        async move {
            let videos = self
                .repository
                .find_by_username_and_mode(username, mode)
                .await?;
            Ok(to_responses(videos))
        }
        .boxed()
    }

    fn get_by_id(&self, id: i64) -> BoxFuture<'_, ServiceResult<Option<MyVideoResponse>>> {
        async move {
            let video = self.repository.find_by_id(id).await?;
            Ok(video.map(MyVideoResponse::from))
        }
        .boxed()
    }

    fn list_by_session_and_mode(
        &self,
        session_id: i64,
        mode: VideoMode,
    ) -> BoxFuture<'_, ServiceResult<Vec<MyVideoResponse>>> {
        async move {
            let videos = self
                .repository
                .find_by_session_and_mode(session_id, mode)
                .await?;
            Ok(to_responses(videos))
        }
        .boxed()
    }

    fn save_recorded_video<'a>(
        &'a self,
        dto: RecordedVideoDto,
        file: UploadedFile,
        username: &'a str,
    ) -> BoxFuture<'a, ServiceResult<RecordedVideo>> {
        self.save(dto, file, username).boxed()
    }

    fn edit_video(&self, id: i64, file: UploadedFile) -> BoxFuture<'_, ServiceResult<RecordedVideo>> {
        self.edit(id, file).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::memory::{MemoryVideoService, memory_service};
    use axum::body::Bytes;
    use chrono::NaiveDate;
    use std::sync::atomic::Ordering;

    fn dto(session_id: i64, hour: u32) -> RecordedVideoDto {
        RecordedVideoDto {
            session_id,
            video_mode: VideoMode::Practice,
            duration: 42,
            recorded_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        }
    }

    fn file(name: &str, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile::new(
            Some(name.to_string()),
            Some("video/mp4".to_string()),
            Bytes::from_static(bytes),
        )
    }

    async fn saved(service: &MemoryVideoService) -> RecordedVideo {
        service
            .save_recorded_video(dto(5, 10), file("take.mp4", b"first"), "dancer")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_uploads_object_and_records_row() {
        let service = memory_service();
        let video = saved(&service).await;

        assert_eq!(video.username, "dancer");
        assert!(video.video_key.starts_with("videos/dancer/5/"));
        assert!(video.video_key.ends_with(".mp4"));
        assert_eq!(video.video_url, format!("memory://{}", video.video_key));
        assert_eq!(service.storage().keys(), vec![video.video_key.clone()]);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_uploaded_object() {
        let service = memory_service();
        service.repository().fail_inserts.store(true, Ordering::SeqCst);

        let result = service
            .save_recorded_video(dto(5, 10), file("take.mp4", b"first"), "dancer")
            .await;

        assert!(matches!(result, Err(VideoServiceError::Database(_))));
        assert!(service.storage().keys().is_empty());
        assert!(service.repository().videos.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_upload_records_nothing() {
        let service = memory_service();
        service.storage().fail_uploads.store(true, Ordering::SeqCst);

        let result = service
            .save_recorded_video(dto(5, 10), file("take.mp4", b"first"), "dancer")
            .await;

        assert!(matches!(result, Err(VideoServiceError::Storage(_))));
        assert!(service.repository().videos.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_replaces_object_and_removes_previous() {
        let service = memory_service();
        let original = saved(&service).await;

        let edited = service
            .edit_video(original.id, file("retake.webm", b"second"))
            .await
            .unwrap();

        assert_eq!(edited.id, original.id);
        assert_ne!(edited.video_key, original.video_key);
        assert!(edited.video_key.ends_with(".webm"));
        assert_eq!(edited.video_url, format!("memory://{}", edited.video_key));
        assert_eq!(service.storage().keys(), vec![edited.video_key.clone()]);

        let stored = service.get_by_id(original.id).await.unwrap().unwrap();
        assert_eq!(stored.video_url, edited.video_url);
    }

    #[tokio::test]
    async fn test_edit_keeps_new_file_when_previous_cannot_be_removed() {
        let service = memory_service();
        let original = saved(&service).await;
        service.storage().fail_deletes.store(true, Ordering::SeqCst);

        let edited = service
            .edit_video(original.id, file("retake.webm", b"second"))
            .await
            .unwrap();

        let keys = service.storage().keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&original.video_key));
        assert!(keys.contains(&edited.video_key));
    }

    #[tokio::test]
    async fn test_edit_of_missing_video_uploads_nothing() {
        let service = memory_service();

        let result = service.edit_video(77, file("retake.webm", b"second")).await;

        assert!(matches!(result, Err(VideoServiceError::NotFound(77))));
        assert!(service.storage().keys().is_empty());
    }

    #[tokio::test]
    async fn test_edit_of_row_removed_before_update_is_not_found() {
        let service = memory_service();
        let original = saved(&service).await;
        service.repository().vanish_on_update.store(true, Ordering::SeqCst);

        let result = service
            .edit_video(original.id, file("retake.webm", b"second"))
            .await;

        assert!(matches!(result, Err(VideoServiceError::NotFound(id)) if id == original.id));
        assert_eq!(service.storage().keys(), vec![original.video_key]);
    }

    #[tokio::test]
    async fn test_listings_are_newest_first() {
        let service = memory_service();
        for hour in [9, 18, 12] {
            service
                .save_recorded_video(dto(3, hour), file("take.mp4", b"bytes"), "dancer")
                .await
                .unwrap();
        }

        let hours = |videos: Vec<MyVideoResponse>| -> Vec<u32> {
            videos
                .iter()
                .map(|v| chrono::Timelike::hour(&v.recorded_at))
                .collect()
        };

        let mine = service.list_by_username("dancer").await.unwrap();
        assert_eq!(hours(mine), vec![18, 12, 9]);

        let session = service
            .list_by_session_and_mode(3, VideoMode::Practice)
            .await
            .unwrap();
        assert_eq!(hours(session), vec![18, 12, 9]);
    }
}
