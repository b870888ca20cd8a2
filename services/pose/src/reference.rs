//! Reference choreography poses loaded from disk
//!
//! Each song has one JSON file,
//! `{dir}/{song_title}_ref_pose_filtered_1sec_normalized.json`, holding an
//! array of `{ "frame": n, "keypoints": [...] }` entries. A song's file is
//! read on first use and kept in memory until [`ReferencePoses::release`].
//! Files that cannot be read or parsed are not cached, so a later request
//! retries them.

use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::keypoints::Keypoint;

const FILE_SUFFIX: &str = "_ref_pose_filtered_1sec_normalized.json";

type SongPoses = HashMap<i64, Vec<Keypoint>>;

#[derive(Error, Debug)]
enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct ReferenceEntry {
    frame: FrameNumber,
    keypoints: Vec<Keypoint>,
}

/// Frame numbers are written either as integers or as numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameNumber {
    Integer(i64),
    Text(String),
}

impl FrameNumber {
    fn value(&self) -> Option<i64> {
        match self {
            FrameNumber::Integer(n) => Some(*n),
            FrameNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Per-song cache of reference poses
pub struct ReferencePoses {
    dir: PathBuf,
    songs: RwLock<HashMap<String, Arc<SongPoses>>>,
}

impl ReferencePoses {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            songs: RwLock::new(HashMap::new()),
        }
    }

    /// Reference keypoints of `song_title` at `frame_index`
    ///
    /// `None` when the song has no readable reference file or the file has no
    /// entry for that frame.
    pub async fn frame(&self, song_title: &str, frame_index: i64) -> Option<Vec<Keypoint>> {
        let song = self.song(song_title).await?;
        song.get(&frame_index).cloned()
    }

    /// Drop every cached song, returning how many were held
    pub fn release(&self) -> usize {
        let mut songs = self.songs.write().unwrap_or_else(|e| e.into_inner());
        let released = songs.len();
        songs.clear();
        released
    }

    async fn song(&self, song_title: &str) -> Option<Arc<SongPoses>> {
        let cached = self
            .songs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(song_title)
            .cloned();
        if cached.is_some() {
            return cached;
        }

        if !is_plain_title(song_title) {
            warn!("Rejected reference pose lookup for song title {:?}", song_title);
            return None;
        }

        let path = self.dir.join(format!("{}{}", song_title, FILE_SUFFIX));
        let song = match load_song(&path).await {
            Ok(song) => Arc::new(song),
            Err(e) => {
                error!("Reference pose unavailable for {}: {}", song_title, e);
                return None;
            }
        };

        info!("Loaded {} reference frames for {}", song.len(), song_title);
        self.songs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(song_title.to_string(), song.clone());

        Some(song)
    }
}

/// Titles name a file inside the reference directory and nothing else
fn is_plain_title(song_title: &str) -> bool {
    !song_title.is_empty()
        && !song_title.contains(['/', '\\'])
        && song_title != "."
        && song_title != ".."
}

async fn load_song(path: &Path) -> Result<SongPoses, LoadError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let entries: Vec<ReferenceEntry> =
        serde_json::from_str(&raw).map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let mut song = SongPoses::with_capacity(entries.len());
    for entry in entries {
        match entry.frame.value() {
            Some(frame) => {
                song.insert(frame, entry.keypoints);
            }
            None => warn!(
                "Skipping reference entry with a non-numeric frame in {}",
                path.display()
            ),
        }
    }

    Ok(song)
}
