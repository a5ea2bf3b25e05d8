use std::fmt;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};
use crate::errors::AppError;
use crate::file_utils::FileManager;

// @module: Subtitle parsing into timed segments

// @const: Timestamp pattern, H:MM:SS with an optional , or . fraction
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})(?:[,.](\d+))?$").unwrap()
});

// @const: Separator between start and end timestamps
const TIME_RANGE_SEPARATOR: &str = "-->";

// @struct: Single subtitle segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            start_time_ms,
            end_time_ms,
            text: text.into(),
        }
    }

    /// End time shifted by a signed extra duration, saturating at zero
    pub fn effective_end_ms(&self, extra_duration_ms: i64) -> u64 {
        self.end_time_ms.saturating_add_signed(extra_duration_ms)
    }

    /// Parse a subtitle timestamp to milliseconds.
    ///
    /// Accepts `H:MM:SS,mmm`, `H:MM:SS.mmm` and `H:MM:SS`. The fraction is read
    /// as a decimal fraction of a second, so `1.5` is 500 ms and `1.2345` is 234 ms.
    pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
        let caps = TIMESTAMP_REGEX.captures(timestamp.trim())?;

        let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
        let seconds: u64 = caps.get(3)?.as_str().parse().ok()?;

        if minutes >= 60 || seconds >= 60 {
            return None;
        }

        let millis = caps.get(4).map_or(0, |m| Self::fraction_to_millis(m.as_str()));

        // Absurd hour fields overflow; the caller skips the block
        hours
            .checked_mul(3_600_000)?
            .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
    }

    fn fraction_to_millis(digits: &str) -> u64 {
        let mut millis = 0;
        for (i, digit) in digits.chars().chain(std::iter::repeat('0')).take(3).enumerate() {
            let value = digit.to_digit(10).unwrap_or(0) as u64;
            millis += value * 10u64.pow(2 - i as u32);
        }
        millis
    }

    /// Parse a `start --> end` line
    pub fn parse_time_range(line: &str) -> Option<(u64, u64)> {
        let (start, end) = line.split_once(TIME_RANGE_SEPARATOR)?;
        // Some files carry positioning hints after the end timestamp
        let end = end.split_whitespace().next()?;
        Some((Self::parse_timestamp(start)?, Self::parse_timestamp(end)?))
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)
    }
}

/// Read and parse an SRT file.
///
/// Only an unreadable file is an error; malformed blocks inside it are skipped.
pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleEntry>, AppError> {
    let path = path.as_ref();
    let content = FileManager::read_to_string(path)
        .map_err(|e| AppError::Subtitle(format!("{:#}", e)))?;
    let entries = parse_srt_string(&content);
    debug!("Parsed {} subtitle segments from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse SRT content into ordered subtitle segments.
///
/// Blocks are separated by blank lines. Each block holds an optional index line,
/// a time-range line and zero or more text lines. Blocks without a usable time
/// range are skipped. The order of the file is kept, so indexes match the file.
pub fn parse_srt_string(content: &str) -> Vec<SubtitleEntry> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_start_line = 0;

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                push_block(&block, block_start_line, &mut entries);
                block.clear();
            }
            continue;
        }
        if block.is_empty() {
            block_start_line = line_no + 1;
        }
        block.push(line);
    }
    if !block.is_empty() {
        push_block(&block, block_start_line, &mut entries);
    }

    if entries.is_empty() {
        warn!("No valid subtitle entries found in content");
        return entries;
    }

    let inverted = entries.iter().filter(|e| e.end_time_ms < e.start_time_ms).count();
    if inverted > 0 {
        warn!("Found {} subtitle entries ending before they start", inverted);
    }

    let overlap_count = entries
        .windows(2)
        .filter(|pair| pair[0].end_time_ms > pair[1].start_time_ms)
        .count();
    if overlap_count > 0 {
        warn!("Found {} overlapping subtitle entries", overlap_count);
    }

    entries
}

fn push_block(block: &[&str], line_no: usize, entries: &mut Vec<SubtitleEntry>) {
    // The index line is optional: a block may start directly with the time range
    let time_line_pos = if block[0].contains(TIME_RANGE_SEPARATOR) { 0 } else { 1 };

    let Some(time_line) = block.get(time_line_pos) else {
        warn!("Skipping subtitle block at line {}: missing time range", line_no);
        return;
    };

    let Some((start_ms, end_ms)) = SubtitleEntry::parse_time_range(time_line) else {
        warn!("Skipping subtitle block at line {}: invalid time range '{}'", line_no, time_line.trim());
        return;
    };

    let text = block[time_line_pos + 1..]
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    entries.push(SubtitleEntry::new(start_ms, end_ms, text.trim_end()));
}
