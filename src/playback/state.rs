/*!
 * Session state owned by the playback controller.
 */

use std::fmt;

use crate::subtitle_processor::SubtitleEntry;
use crate::timeline::Timeline;

/// Mode interrupted by a user pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PausedFrom {
    Normal,
    InSegment,
    RepeatPause,
    SegmentPause,
}

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Free playback; segments are tracked for display and entry detection
    #[default]
    Normal,
    /// Drilling the current segment
    InSegment,
    /// Paused between repetitions, waiting for the resume timer
    RepeatPause,
    /// Paused after the last repetition, waiting for the advance timer
    SegmentPause,
    /// Paused by the user; automatic logic is suspended
    UserPaused { from: PausedFrom },
}

impl PlaybackMode {
    /// Whether the current segment is being drilled (possibly behind a user pause)
    pub fn is_drilling(&self) -> bool {
        match self {
            Self::Normal | Self::UserPaused { from: PausedFrom::Normal } => false,
            Self::InSegment | Self::RepeatPause | Self::SegmentPause | Self::UserPaused { .. } => true,
        }
    }

    /// Short lowercase name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::InSegment => "segment",
            Self::RepeatPause => "repeat pause",
            Self::SegmentPause => "segment pause",
            Self::UserPaused { .. } => "paused",
        }
    }
}

impl From<PlaybackMode> for PausedFrom {
    fn from(mode: PlaybackMode) -> Self {
        match mode {
            PlaybackMode::Normal => PausedFrom::Normal,
            PlaybackMode::InSegment => PausedFrom::InSegment,
            PlaybackMode::RepeatPause => PausedFrom::RepeatPause,
            PlaybackMode::SegmentPause => PausedFrom::SegmentPause,
            PlaybackMode::UserPaused { from } => from,
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Segments plus the drilling position within them
#[derive(Debug, Clone)]
pub struct TimelineState {
    pub timeline: Timeline,
    /// In `[0, len]`; `len` means every segment is done
    pub current_index: usize,
    /// Repetitions completed for `current_index`
    pub repetition: u32,
    pub extra_duration_ms: i64,
    pub mode: PlaybackMode,
    /// Most recently completed segment, never re-entered by free playback
    pub last_completed: Option<usize>,
}

impl TimelineState {
    pub fn new(timeline: Timeline, start_index: usize, extra_duration_ms: i64) -> Self {
        let current_index = timeline.clamp_index(start_index);
        Self {
            timeline,
            current_index,
            repetition: 0,
            extra_duration_ms,
            mode: PlaybackMode::Normal,
            last_completed: None,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.timeline.len()
    }

    /// Segment at `current_index`, `None` once past the end
    pub fn current_segment(&self) -> Option<&SubtitleEntry> {
        self.timeline.get(self.current_index)
    }

    /// End of the current segment plus the extra duration
    pub fn effective_segment_end_ms(&self) -> Option<u64> {
        self.timeline.effective_end_ms(self.current_index, self.extra_duration_ms)
    }

    /// Every segment has been completed
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.timeline.len()
    }

    /// Move to `index` and reset the repetition count
    pub fn set_current(&mut self, index: usize) {
        self.current_index = index.min(self.timeline.len());
        self.repetition = 0;
    }
}
