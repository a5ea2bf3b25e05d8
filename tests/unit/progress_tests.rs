/*!
 * Tests for progress persistence
 */

use std::fs;
use anyhow::Result;
use langrepeat::errors::ProgressError;
use langrepeat::progress::{ProgressMap, ProgressRecord, ProgressStore};
use crate::common;

#[test]
fn test_save_then_load_withRecords_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ProgressStore::new(temp_dir.path().join("current_segment.json"));

    let mut map = ProgressMap::new();
    map.insert(
        "movie.mp4".to_string(),
        ProgressRecord {
            current_segment: Some(12),
            full_path: Some(temp_dir.path().join("movie.mp4")),
        },
    );
    map.insert(
        "other.mkv".to_string(),
        ProgressRecord { current_segment: Some(0), full_path: None },
    );

    assert!(store.save(&map));
    assert_eq!(store.load(), map);
    Ok(())
}

#[test]
fn test_save_withRecord_shouldUseExternalFieldNames() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ProgressStore::new(temp_dir.path().join("progress.json"));

    let mut map = ProgressMap::new();
    map.insert(
        "movie.mp4".to_string(),
        ProgressRecord { current_segment: Some(3), full_path: None },
    );
    store.try_save(&map)?;

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
    assert_eq!(json["movie.mp4"]["CurrentSegment"], 3);
    assert!(json["movie.mp4"].get("FullPath").is_none());
    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ProgressStore::new(temp_dir.path().join("absent.json"));

    assert!(store.load().is_empty());
    assert_eq!(store.lookup("movie.mp4"), None);
    Ok(())
}

#[test]
fn test_load_withCorruptFile_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "progress.json", "{ not json")?;
    let store = ProgressStore::new(path);

    assert!(store.try_load().is_err());
    assert!(store.load().is_empty());
    Ok(())
}

#[test]
fn test_load_withExternalDocument_shouldReadPascalCaseFields() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "progress.json",
        r#"{"movie.mp4": {"CurrentSegment": 7, "FullPath": "/videos/movie.mp4"}, "bare.mkv": {}}"#,
    )?;
    let store = ProgressStore::new(path);

    assert_eq!(store.lookup("/anywhere/movie.mp4"), Some(7));
    assert_eq!(store.lookup("bare.mkv"), None);
    Ok(())
}

#[test]
fn test_record_position_withOtherVideos_shouldPreserveTheirRecords() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ProgressStore::new(temp_dir.path().join("progress.json"));
    let video = common::create_test_file(temp_dir.path(), "movie.mp4", "")?;

    assert!(store.record_position("other.mkv", 4));
    assert!(store.record_position(&video, 2));
    assert!(store.record_position(&video, 5));

    let map = store.load();
    assert_eq!(map.len(), 2);
    assert_eq!(map["other.mkv"].current_segment, Some(4));
    assert_eq!(map["movie.mp4"].current_segment, Some(5));
    assert_eq!(map["movie.mp4"].full_path, Some(fs::canonicalize(&video)?));
    Ok(())
}

#[test]
fn test_record_position_withMissingDirectory_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ProgressStore::new(temp_dir.path().join("nested").join("progress.json"));

    assert!(store.record_position("movie.mp4", 1));
    assert_eq!(store.lookup("movie.mp4"), Some(1));
    Ok(())
}

#[test]
fn test_save_withUnwritableTarget_shouldReturnFalseAndKeepTarget() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    // A directory in place of the progress file makes the final rename fail
    let target = temp_dir.path().join("progress.json");
    fs::create_dir(&target)?;
    let kept = common::create_test_file(&target, "keep.txt", "previous")?;
    let store = ProgressStore::new(target.clone());

    let mut map = ProgressMap::new();
    map.insert(
        "movie.mp4".to_string(),
        ProgressRecord { current_segment: Some(3), full_path: None },
    );

    assert!(matches!(store.try_save(&map), Err(ProgressError::Persist(_))));
    assert!(!store.save(&map));
    assert!(!store.record_position("movie.mp4", 4));

    assert!(target.is_dir());
    assert_eq!(fs::read_to_string(&kept)?, "previous");
    // No temporary file is left next to the target
    assert_eq!(fs::read_dir(temp_dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn test_video_key_withFullPath_shouldUseFileName() {
    assert_eq!(ProgressStore::video_key("/videos/season 1/ep01.mkv"), "ep01.mkv");
    assert_eq!(ProgressStore::video_key("ep01.mkv"), "ep01.mkv");
}

#[test]
fn test_resolve_video_withStoredKey_shouldReturnFullPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ProgressStore::new(temp_dir.path().join("progress.json"));
    let video = common::create_test_file(temp_dir.path(), "movie.mp4", "")?;
    store.record_position(&video, 0);

    // Only the file name is given, from another working directory
    let resolved = store.resolve_video("movie.mp4");
    assert_eq!(resolved, Some(fs::canonicalize(&video)?));

    assert_eq!(store.resolve_video("unknown.mp4"), None);
    assert_eq!(store.resolve_video(&video), Some(video.clone()));
    Ok(())
}
