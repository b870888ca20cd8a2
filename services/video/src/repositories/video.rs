//! Recorded video repository for database operations

use chrono::NaiveDateTime;
use common::error::DatabaseResult;
use futures::future::{BoxFuture, FutureExt};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::VideoRecords;
use crate::models::{RecordedVideo, VideoMode};

const VIDEO_COLUMNS: &str = "id, username, session_id, video_mode, video_key, video_url, \
                             duration, recorded_at, created_at, updated_at";

/// Values inserted for a freshly uploaded video
#[derive(Debug, Clone)]
pub struct NewRecordedVideo {
    pub username: String,
    pub session_id: i64,
    pub video_mode: VideoMode,
    pub video_key: String,
    pub video_url: String,
    pub duration: i32,
    pub recorded_at: NaiveDateTime,
}

/// Recorded video repository
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new recorded video repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl VideoRecords for VideoRepository {
    fn find_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, DatabaseResult<Vec<RecordedVideo>>> {
        async move {
            let rows = sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM recorded_videos \
                 WHERE username = $1 ORDER BY recorded_at DESC, id DESC"
            ))
            .bind(username)
            .fetch_all(&self.pool)
            .await?;

            map_rows(rows)
        }
        .boxed()
    }

    fn find_by_username_and_mode<'a>(
        &'a self,
        username: &'a str,
        mode: VideoMode,
    ) -> BoxFuture<'a, DatabaseResult<Vec<RecordedVideo>>> {
        async move {
            let rows = sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM recorded_videos \
                 WHERE username = $1 AND video_mode = $2 ORDER BY recorded_at DESC, id DESC"
            ))
            .bind(username)
            .bind(mode.as_str())
            .fetch_all(&self.pool)
            .await?;

            map_rows(rows)
        }
        .boxed()
    }

    fn find_by_id(&self, id: i64) -> BoxFuture<'_, DatabaseResult<Option<RecordedVideo>>> {
        async move {
            let row = sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM recorded_videos WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.as_ref().map(map_row).transpose()
        }
        .boxed()
    }

    fn find_by_session_and_mode(
        &self,
        session_id: i64,
        mode: VideoMode,
    ) -> BoxFuture<'_, DatabaseResult<Vec<RecordedVideo>>> {
        async move {
            let rows = sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM recorded_videos \
                 WHERE session_id = $1 AND video_mode = $2 ORDER BY recorded_at DESC, id DESC"
            ))
            .bind(session_id)
            .bind(mode.as_str())
            .fetch_all(&self.pool)
            .await?;

            map_rows(rows)
        }
        .boxed()
    }

    fn insert<'a>(
        &'a self,
        video: &'a NewRecordedVideo,
    ) -> BoxFuture<'a, DatabaseResult<RecordedVideo>> {
        async move {
            let row = sqlx::query(&format!(
                "INSERT INTO recorded_videos \
                 (username, session_id, video_mode, video_key, video_url, duration, recorded_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {VIDEO_COLUMNS}"
            ))
            .bind(&video.username)
            .bind(video.session_id)
            .bind(video.video_mode.as_str())
            .bind(&video.video_key)
            .bind(&video.video_url)
            .bind(video.duration)
            .bind(video.recorded_at)
            .fetch_one(&self.pool)
            .await?;

            map_row(&row)
        }
        .boxed()
    }

    fn update_file<'a>(
        &'a self,
        id: i64,
        video_key: &'a str,
        video_url: &'a str,
    ) -> BoxFuture<'a, DatabaseResult<Option<RecordedVideo>>> {
        async move {
            let row = sqlx::query(&format!(
                "UPDATE recorded_videos \
                 SET video_key = $2, video_url = $3, updated_at = NOW() \
                 WHERE id = $1 \
                 RETURNING {VIDEO_COLUMNS}"
            ))
            .bind(id)
            .bind(video_key)
            .bind(video_url)
            .fetch_optional(&self.pool)
            .await?;

            row.as_ref().map(map_row).transpose()
        }
        .boxed()
    }
}

fn map_rows(rows: Vec<PgRow>) -> DatabaseResult<Vec<RecordedVideo>> {
    rows.iter().map(map_row).collect()
}

fn map_row(row: &PgRow) -> DatabaseResult<RecordedVideo> {
    let video_mode: String = row.try_get("video_mode")?;
    let video_mode = video_mode
        .parse::<VideoMode>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(RecordedVideo {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        session_id: row.try_get("session_id")?,
        video_mode,
        video_key: row.try_get("video_key")?,
        video_url: row.try_get("video_url")?,
        duration: row.try_get("duration")?,
        recorded_at: row.try_get("recorded_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::database::{DatabaseConfig, init_pool, run_migrations};
    use uuid::Uuid;

    async fn repository() -> VideoRepository {
        let config = DatabaseConfig::from_env().expect("database config");
        let pool = init_pool(&config).await.expect("database pool");
        run_migrations(&pool).await.expect("migrations");
        VideoRepository::new(pool)
    }

    fn new_video(username: &str, session_id: i64, hour: u32) -> NewRecordedVideo {
        NewRecordedVideo {
            username: username.to_string(),
            session_id,
            video_mode: VideoMode::Practice,
            video_key: format!("videos/{}/{}/{}.mp4", username, session_id, hour),
            video_url: format!("https://cdn.example.com/{}.mp4", hour),
            duration: 30,
            recorded_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_listings_are_newest_first() {
        let repository = repository().await;
        let username = format!("order-{}", Uuid::new_v4());
        let session_id = i64::from(Uuid::new_v4().as_fields().0);

        let early = repository.insert(&new_video(&username, session_id, 8)).await.unwrap();
        let late = repository.insert(&new_video(&username, session_id, 20)).await.unwrap();
        let tie = repository.insert(&new_video(&username, session_id, 20)).await.unwrap();

        let ids: Vec<i64> = repository
            .find_by_username(&username)
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![tie.id, late.id, early.id]);

        let ids: Vec<i64> = repository
            .find_by_session_and_mode(session_id, VideoMode::Practice)
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![tie.id, late.id, early.id]);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_update_file_of_missing_row_is_none() {
        let repository = repository().await;
        let updated = repository
            .update_file(i64::MAX, "videos/none.mp4", "https://cdn.example.com/none.mp4")
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_update_file_replaces_key_and_url() {
        let repository = repository().await;
        let username = format!("edit-{}", Uuid::new_v4());
        let saved = repository.insert(&new_video(&username, 1, 9)).await.unwrap();

        let updated = repository
            .update_file(saved.id, "videos/new.webm", "https://cdn.example.com/new.webm")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.video_key, "videos/new.webm");
        assert_eq!(updated.video_url, "https://cdn.example.com/new.webm");
        assert_eq!(updated.recorded_at, saved.recorded_at);
    }
}
