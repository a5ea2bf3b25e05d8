use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;

// @module: File and directory utilities

// @const: SRT block start, sequence number followed by a time range
static SRT_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s*\r?\n\d+:\d{2}:\d{2}[,.]\d{1,3}\s*-->").unwrap()
});

// @const: Extensions treated as video without probing
const VIDEO_EXTENSIONS: [&str; 14] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
    "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    // @generates: Companion subtitle path, `<dir>/<stem><suffix>`
    pub fn companion_subtitle_path<P: AsRef<Path>>(video_path: P, suffix: &str) -> PathBuf {
        let video_path = video_path.as_ref();
        let stem = video_path.file_stem().unwrap_or_default().to_string_lossy();
        video_path.with_file_name(format!("{}{}", stem, suffix))
    }

    /// Find the subtitle file for a video.
    ///
    /// Tries `<stem><suffix>` first, then `<stem>.srt`.
    pub fn find_subtitle_for<P: AsRef<Path>>(video_path: P, suffix: &str) -> Option<PathBuf> {
        let video_path = video_path.as_ref();
        let companion = Self::companion_subtitle_path(video_path, suffix);
        if Self::file_exists(&companion) {
            return Some(companion);
        }
        let plain = video_path.with_extension("srt");
        if plain != video_path && Self::file_exists(&plain) {
            return Some(plain);
        }
        None
    }

    /// Detect if a file is a subtitle file (SRT) or a video file
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        // Check file extension
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();

            if ext_str == "srt" {
                return Ok(FileType::Subtitle);
            }

            if VIDEO_EXTENSIONS.contains(&ext_str.as_str()) {
                return Ok(FileType::Video);
            }
        }

        // Fall back to examining file contents
        if let Ok(content) = fs::read_to_string(path) {
            if content.contains("-->") && SRT_BLOCK_REGEX.is_match(&content) {
                return Ok(FileType::Subtitle);
            }
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT)
    Subtitle,
    /// Video file
    Video,
    /// Unknown file type
    Unknown,
}
