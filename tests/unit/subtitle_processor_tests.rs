/*!
 * Tests for subtitle parsing functionality
 */

use std::fmt::Write;
use anyhow::Result;
use langrepeat::errors::AppError;
use langrepeat::subtitle_processor::{self, SubtitleEntry};
use langrepeat::timeline::Timeline;
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

#[test]
fn test_timestamp_parsing_withPeriodSeparator_shouldMatchComma() {
    assert_eq!(SubtitleEntry::parse_timestamp("00:00:01.500"), Some(1500));
    assert_eq!(SubtitleEntry::parse_timestamp("00:00:01,500"), Some(1500));
}

#[test]
fn test_timestamp_parsing_withoutMilliseconds_shouldDefaultToZero() {
    assert_eq!(SubtitleEntry::parse_timestamp("00:01:02"), Some(62000));
}

#[test]
fn test_timestamp_parsing_withShortFraction_shouldReadAsDecimal() {
    assert_eq!(SubtitleEntry::parse_timestamp("00:00:02,5"), Some(2500));
    assert_eq!(SubtitleEntry::parse_timestamp("00:00:02,05"), Some(2050));
}

#[test]
fn test_timestamp_parsing_withGarbage_shouldReturnNone() {
    assert_eq!(SubtitleEntry::parse_timestamp("not a time"), None);
    assert_eq!(SubtitleEntry::parse_timestamp("00:61:00,000"), None);
    assert_eq!(SubtitleEntry::parse_timestamp(""), None);
}

#[test]
fn test_timestamp_parsing_withOverflowingHours_shouldReturnNone() {
    assert_eq!(SubtitleEntry::parse_timestamp("9999999999999:00:00,000"), None);
    assert_eq!(SubtitleEntry::parse_timestamp("99999999999999999999999:00:00"), None);
}

#[test]
fn test_time_range_withTrailingHints_shouldIgnoreThem() {
    let range = SubtitleEntry::parse_time_range("00:00:01,000 --> 00:00:02,000 X1:10 X2:20");
    assert_eq!(range, Some((1000, 2000)));
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatCorrectly() {
    let entry = SubtitleEntry::new(5000, 10000, "Test subtitle");
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert!(output.contains("00:00:05,000 --> 00:00:10,000"));
    assert!(output.contains("Test subtitle"));
}

#[test]
fn test_parse_srt_string_withTwoBlocks_shouldProduceOrderedSegments() {
    let segments = subtitle_processor::parse_srt_string(common::TWO_SEGMENT_SRT);

    assert_eq!(
        segments,
        vec![
            SubtitleEntry::new(1000, 3000, "Hello"),
            SubtitleEntry::new(5000, 7000, "World"),
        ]
    );

    let timeline = Timeline::new(segments);
    assert_eq!(timeline.find_segment_at(2000, 0), Some(0));
    assert_eq!(timeline.find_segment_at(4000, 0), None);
    assert_eq!(timeline.find_segment_at(9000, 0), None);
}

#[test]
fn test_parse_srt_string_withMalformedBlock_shouldSkipOnlyThatBlock() {
    let content = "1
00:00:01,000 --> 00:00:02,000
First

2
garbage --> 00:00:04,000
Broken

3
00:00:05,000 --> 00:00:06,000
Third
";
    let segments = subtitle_processor::parse_srt_string(content);

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "First");
    assert_eq!(segments[1].text, "Third");
    assert_eq!(segments[1].start_time_ms, 5000);
}

#[test]
fn test_parse_srt_string_withOverflowingTimestamp_shouldSkipOnlyThatBlock() {
    let content = "1
9999999999999:00:00,000 --> 9999999999999:00:01,000
Bad

2
00:00:05,000 --> 00:00:07,000
World
";
    let segments = subtitle_processor::parse_srt_string(content);

    assert_eq!(segments, vec![SubtitleEntry::new(5000, 7000, "World")]);
}

#[test]
fn test_parse_srt_string_withMultilineTextAndCrlf_shouldJoinLines() {
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nLine one\r\nLine two\r\n\r\n";
    let segments = subtitle_processor::parse_srt_string(content);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "Line one\nLine two");
}

#[test]
fn test_parse_srt_string_withBomAndNoIndexLine_shouldParse() {
    let content = "\u{feff}00:00:01,000 --> 00:00:02,000\nNo index\n";
    let segments = subtitle_processor::parse_srt_string(content);

    assert_eq!(segments, vec![SubtitleEntry::new(1000, 2000, "No index")]);
}

#[test]
fn test_parse_srt_string_withInvertedRange_shouldKeepSegment() {
    let content = "1\n00:00:05,000 --> 00:00:04,000\nBackwards\n";
    let segments = subtitle_processor::parse_srt_string(content);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start_time_ms, 5000);
    assert_eq!(segments[0].end_time_ms, 4000);
}

#[test]
fn test_parse_srt_string_withEmptyInput_shouldReturnNoSegments() {
    assert!(subtitle_processor::parse_srt_string("").is_empty());
    assert!(subtitle_processor::parse_srt_string("\n\n  \n").is_empty());
}

#[test]
fn test_parse_srt_file_withValidFile_shouldParseSegments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let segments = subtitle_processor::parse_srt_file(&path)?;
    assert_eq!(segments, common::two_segments());
    Ok(())
}

#[test]
fn test_parse_srt_file_withMissingFile_shouldReturnSubtitleError() {
    let result = subtitle_processor::parse_srt_file("/no/such/dir/missing.srt");
    assert!(matches!(result, Err(AppError::Subtitle(_))));
}
