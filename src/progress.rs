/*!
 * Progress persistence.
 *
 * Maps a video's file name to the last active segment index and the full path
 * the video was last opened from. Stored as one pretty-printed JSON document:
 *
 * ```json
 * {
 *   "lesson01.mp4": {
 *     "CurrentSegment": 12,
 *     "FullPath": "/home/me/videos/lesson01.mp4"
 *   }
 * }
 * ```
 *
 * Read failures never reach the caller: a missing or corrupt file means
 * "start fresh".
 */

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::errors::ProgressError;

/// Default progress file name, relative to the working directory
pub const DEFAULT_PROGRESS_FILE: &str = "current_segment.json";

/// Stored progress for one video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Last active segment index (0-based)
    #[serde(rename = "CurrentSegment", default, skip_serializing_if = "Option::is_none")]
    pub current_segment: Option<usize>,

    /// Full path the video was opened from, for reloading without a path
    #[serde(rename = "FullPath", default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<PathBuf>,
}

/// Progress records keyed by video file name
pub type ProgressMap = BTreeMap<String, ProgressRecord>;

/// File-backed progress store
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Create a store backed by `path`; nothing is read until `load`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stable key for a video: its file name, since full paths vary by machine
    pub fn video_key<P: AsRef<Path>>(video_path: P) -> String {
        let video_path = video_path.as_ref();
        video_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| video_path.to_string_lossy().to_string())
    }

    /// Load all records, surfacing failures
    pub fn try_load(&self) -> Result<ProgressMap, ProgressError> {
        if !self.path.exists() {
            return Ok(ProgressMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ProgressMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Load all records. A missing or unreadable file yields an empty map.
    pub fn load(&self) -> ProgressMap {
        match self.try_load() {
            Ok(map) => {
                debug!("Loaded {} progress records from {}", map.len(), self.path.display());
                map
            }
            Err(e) => {
                warn!("Could not load progress from {}: {}", self.path.display(), e);
                ProgressMap::new()
            }
        }
    }

    /// Write the whole document, replacing the previous file atomically
    pub fn try_save(&self, map: &ProgressMap) -> Result<(), ProgressError> {
        let json = serde_json::to_string_pretty(map)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.flush()?;
        temp.persist(&self.path)
            .map_err(|e| ProgressError::Persist(e.error.to_string()))?;
        Ok(())
    }

    /// Write the whole document. Failures are logged and leave the old file in place.
    pub fn save(&self, map: &ProgressMap) -> bool {
        match self.try_save(map) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not save progress to {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Stored segment index for a video, if any
    pub fn lookup<P: AsRef<Path>>(&self, video_path: P) -> Option<usize> {
        let key = Self::video_key(video_path);
        let index = self.load().get(&key).and_then(|record| record.current_segment);
        match index {
            Some(index) => debug!("Found saved segment {} for {}", index, key),
            None => debug!("No saved segment for {}", key),
        }
        index
    }

    /// Read-modify-write the record of one video, keeping every other key
    pub fn record_position<P: AsRef<Path>>(&self, video_path: P, segment_index: usize) -> bool {
        let video_path = video_path.as_ref();
        let key = Self::video_key(video_path);
        let full_path = std::fs::canonicalize(video_path).ok();

        let mut map = self.load();
        let record = map.entry(key.clone()).or_default();
        record.current_segment = Some(segment_index);
        if full_path.is_some() {
            record.full_path = full_path;
        }

        let saved = self.save(&map);
        if saved {
            info!("Saved segment {} for {} in {}", segment_index, key, self.path.display());
        }
        saved
    }

    /// Resolve a video argument: an existing path as is, otherwise a stored key's full path
    pub fn resolve_video<P: AsRef<Path>>(&self, video: P) -> Option<PathBuf> {
        let video = video.as_ref();
        if video.exists() {
            return Some(video.to_path_buf());
        }
        let key = Self::video_key(video);
        self.load()
            .get(&key)
            .and_then(|record| record.full_path.clone())
            .filter(|path| path.exists())
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_FILE)
    }
}
