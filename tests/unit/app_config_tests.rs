/*!
 * Tests for application configuration functionality
 */

use std::fs;
use anyhow::Result;
use langrepeat::app_config::{Config, JumpPolicy, LogLevel, PlaybackConfig};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.playback.start_segment_index, 0);
    assert_eq!(config.playback.repeat_delay_ms, 2000);
    assert_eq!(config.playback.segment_pause_ms, 0);
    assert_eq!(config.playback.repetitions_per_segment, 3);
    assert_eq!(config.playback.tick_period_ms, 100);
    assert_eq!(config.playback.extra_duration_step_ms, 1000);
    assert_eq!(config.playback.extra_duration_min_ms, -1000);
    assert_eq!(config.playback.initial_extra_duration_ms, 0);
    assert_eq!(config.playback.jump_policy, JumpPolicy::Drill);
    assert_eq!(config.progress_file.to_str(), Some("current_segment.json"));
    assert_eq!(config.subtitle_suffix, "_word_merge_translated.srt");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withInvalidValues_shouldFail() {
    let invalid = [
        PlaybackConfig { repetitions_per_segment: 0, ..PlaybackConfig::default() },
        PlaybackConfig { tick_period_ms: 0, ..PlaybackConfig::default() },
        PlaybackConfig { extra_duration_step_ms: 0, ..PlaybackConfig::default() },
        PlaybackConfig { initial_extra_duration_ms: -5000, ..PlaybackConfig::default() },
    ];

    for playback in invalid {
        let config = Config { playback: playback.clone(), ..Config::default() };
        assert!(config.validate().is_err(), "accepted {:?}", playback);
    }

    let config = Config { subtitle_suffix: "  ".to_string(), ..Config::default() };
    assert!(config.validate().is_err());
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.playback, PlaybackConfig::default());

    // The written file loads back to the same values
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.playback, config.playback);
    assert_eq!(reloaded.subtitle_suffix, config.subtitle_suffix);
    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"playback": {"repetitions_per_segment": 5, "jump_policy": "free_play"}, "log_level": "debug"}"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.playback.repetitions_per_segment, 5);
    assert_eq!(config.playback.jump_policy, JumpPolicy::FreePlay);
    assert_eq!(config.playback.repeat_delay_ms, 2000);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.subtitle_suffix, "_word_merge_translated.srt");
    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ nope")?;

    assert!(Config::load_or_create(&path).is_err());
    // A broken file is never overwritten
    assert_eq!(fs::read_to_string(&path)?, "{ nope");
    Ok(())
}

#[test]
fn test_jump_policy_fromStr_withKnownNames_shouldParse() {
    assert_eq!("drill".parse::<JumpPolicy>().unwrap(), JumpPolicy::Drill);
    assert_eq!("free-play".parse::<JumpPolicy>().unwrap(), JumpPolicy::FreePlay);
    assert_eq!("FreePlay".parse::<JumpPolicy>().unwrap(), JumpPolicy::FreePlay);
    assert!("wander".parse::<JumpPolicy>().is_err());
    assert_eq!(JumpPolicy::FreePlay.to_string(), "free_play");
}

#[test]
fn test_log_level_toLevelFilter_shouldMatch() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
