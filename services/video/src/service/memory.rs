use std::{
    collections::BTreeMap,
    sync::{
        RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use axum::body::Bytes;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use futures::future::{BoxFuture, FutureExt};

use crate::{
    models::{RecordedVideo, UploadedFile, VideoMode},
    repositories::{NewRecordedVideo, VideoRecords},
    service::RecordedVideoService,
    storage::{ObjectStore, StorageError},
};

pub(crate) type MemoryVideoService = RecordedVideoService<MemoryRecords, MemoryObjects>;

/// [`RecordedVideoService`] running without PostgreSQL or S3
pub(crate) fn memory_service() -> MemoryVideoService {
    RecordedVideoService::new(MemoryRecords::default(), MemoryObjects::default())
}

/// In-memory [`VideoRecords`]
#[derive(Default)]
pub(crate) struct MemoryRecords {
    pub(crate) videos: RwLock<Vec<RecordedVideo>>,
    /// Make every insert fail
    pub(crate) fail_inserts: AtomicBool,
    /// Remove the row when `update_file` runs, as a concurrent delete would
    pub(crate) vanish_on_update: AtomicBool,
}

impl MemoryRecords {
    fn select<F>(&self, predicate: F) -> Vec<RecordedVideo>
    where
        F: Fn(&RecordedVideo) -> bool,
    {
        let videos = self.videos.read().unwrap();
        let mut selected: Vec<RecordedVideo> =
            videos.iter().filter(|v| predicate(*v)).cloned().collect();
        selected.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        selected
    }
}

impl VideoRecords for MemoryRecords {
    fn find_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, DatabaseResult<Vec<RecordedVideo>>> {
        let result = self.select(|v| v.username == username);
        async move { Ok(result) }.boxed()
    }

    fn find_by_username_and_mode<'a>(
        &'a self,
        username: &'a str,
        mode: VideoMode,
    ) -> BoxFuture<'a, DatabaseResult<Vec<RecordedVideo>>> {
        let result = self.select(|v| v.username == username && v.video_mode == mode);
        async move { Ok(result) }.boxed()
    }

    fn find_by_id(&self, id: i64) -> BoxFuture<'_, DatabaseResult<Option<RecordedVideo>>> {
        let result = self.select(|v| v.id == id).into_iter().next();
        async move { Ok(result) }.boxed()
    }

    fn find_by_session_and_mode(
        &self,
        session_id: i64,
        mode: VideoMode,
    ) -> BoxFuture<'_, DatabaseResult<Vec<RecordedVideo>>> {
        let result = self.select(|v| v.session_id == session_id && v.video_mode == mode);
        async move { Ok(result) }.boxed()
    }

    fn insert<'a>(
        &'a self,
        video: &'a NewRecordedVideo,
    ) -> BoxFuture<'a, DatabaseResult<RecordedVideo>> {
        let result = if self.fail_inserts.load(Ordering::SeqCst) {
            Err(DatabaseError::Query(sqlx::Error::Protocol(
                "insert rejected".to_string(),
            )))
        } else {
            let mut videos = self.videos.write().unwrap();
            let id = videos.iter().map(|v| v.id).max().unwrap_or(0) + 1;
            let now = Utc::now();
            let stored = RecordedVideo {
                id,
                username: video.username.clone(),
                session_id: video.session_id,
                video_mode: video.video_mode,
                video_key: video.video_key.clone(),
                video_url: video.video_url.clone(),
                duration: video.duration,
                recorded_at: video.recorded_at,
                created_at: now,
                updated_at: now,
            };
            videos.push(stored.clone());
            Ok(stored)
        };

        async move { result }.boxed()
    }

    fn update_file<'a>(
        &'a self,
        id: i64,
        video_key: &'a str,
        video_url: &'a str,
    ) -> BoxFuture<'a, DatabaseResult<Option<RecordedVideo>>> {
        let mut videos = self.videos.write().unwrap();
        if self.vanish_on_update.load(Ordering::SeqCst) {
            videos.retain(|v| v.id != id);
        }

        let result = videos.iter_mut().find(|v| v.id == id).map(|video| {
            video.video_key = video_key.to_string();
            video.video_url = video_url.to_string();
            video.updated_at = Utc::now();
            video.clone()
        });

        async move { Ok(result) }.boxed()
    }
}

/// In-memory [`ObjectStore`] keyed by object key
#[derive(Default)]
pub(crate) struct MemoryObjects {
    pub(crate) objects: RwLock<BTreeMap<String, Bytes>>,
    pub(crate) fail_uploads: AtomicBool,
    pub(crate) fail_deletes: AtomicBool,
}

impl MemoryObjects {
    pub(crate) fn keys(&self) -> Vec<String> {
        self.objects.read().unwrap().keys().cloned().collect()
    }
}

impl ObjectStore for MemoryObjects {
    fn public_url(&self, key: &str) -> String {
        format!("memory://{}", key)
    }

    fn upload<'a>(
        &'a self,
        key: &'a str,
        file: &'a UploadedFile,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        let result = if self.fail_uploads.load(Ordering::SeqCst) {
            Err(StorageError::Upload {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            })
        } else {
            self.objects
                .write()
                .unwrap()
                .insert(key.to_string(), file.bytes.clone());
            Ok(())
        };

        async move { result }.boxed()
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        let result = if self.fail_deletes.load(Ordering::SeqCst) {
            Err(StorageError::Delete {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            })
        } else {
            self.objects.write().unwrap().remove(key);
            Ok(())
        };

        async move { result }.boxed()
    }
}
