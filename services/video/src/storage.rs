//! S3 storage for uploaded video files

use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::ByteStream};
use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::UploadedFile;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to upload object {key}: {message}")]
    Upload { key: String, message: String },

    #[error("Failed to delete object {key}: {message}")]
    Delete { key: String, message: String },
}

/// Bucket holding the recorded video objects
#[derive(Clone)]
pub struct VideoStorage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl VideoStorage {
    pub fn new(client: Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

/// Object store holding the bytes of recorded videos
pub trait ObjectStore: Send + Sync {
    /// Fresh object key for a video of `username` recorded in `session_id`
    fn object_key(&self, username: &str, session_id: i64, file: &UploadedFile) -> String {
        build_object_key(username, session_id, &file.extension(), Uuid::new_v4())
    }

    /// URL clients use to fetch the object
    fn public_url(&self, key: &str) -> String;

    fn upload<'a>(
        &'a self,
        key: &'a str,
        file: &'a UploadedFile,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;
}

impl ObjectStore for VideoStorage {
    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }

    fn upload<'a>(
        &'a self,
        key: &'a str,
        file: &'a UploadedFile,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(ByteStream::from(file.bytes.clone()))
                .content_type(&file.content_type)
                .content_length(file.len() as i64)
                .send()
                .await
                .map_err(|e| StorageError::Upload {
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            info!("Uploaded {} bytes to s3://{}/{}", file.len(), self.bucket, key);
            Ok(())
        }
        .boxed()
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| StorageError::Delete {
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            info!("Deleted s3://{}/{}", self.bucket, key);
            Ok(())
        }
        .boxed()
    }
}

fn build_object_key(username: &str, session_id: i64, extension: &str, id: Uuid) -> String {
    let owner: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("videos/{}/{}/{}.{}", owner, session_id, id, extension)
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
