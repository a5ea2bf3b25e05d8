/*!
 * Timeline index over parsed subtitle segments.
 *
 * Answers "which segment covers this playback position?" taking the
 * session's extra duration into account.
 */

use crate::subtitle_processor::SubtitleEntry;

/// Ordered, read-only sequence of segments
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    segments: Vec<SubtitleEntry>,
}

impl Timeline {
    /// Create a timeline from segments in file order
    pub fn new(segments: Vec<SubtitleEntry>) -> Self {
        Self { segments }
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the timeline has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at `index`, if any
    pub fn get(&self, index: usize) -> Option<&SubtitleEntry> {
        self.segments.get(index)
    }

    /// All segments in order
    pub fn segments(&self) -> &[SubtitleEntry] {
        &self.segments
    }

    /// Effective end of the segment at `index`
    pub fn effective_end_ms(&self, index: usize, extra_duration_ms: i64) -> Option<u64> {
        self.get(index).map(|s| s.effective_end_ms(extra_duration_ms))
    }

    /// Whether `position_ms` lies in `[start, end + extra]` of the segment at `index`
    pub fn contains(&self, index: usize, position_ms: u64, extra_duration_ms: i64) -> bool {
        self.get(index).is_some_and(|s| {
            s.start_time_ms <= position_ms && position_ms <= s.effective_end_ms(extra_duration_ms)
        })
    }

    /// Find the first segment covering `position_ms`.
    ///
    /// Overlapping segments resolve to the earliest one in sequence order.
    /// Linear on purpose: malformed input may be unsorted or overlapping.
    pub fn find_segment_at(&self, position_ms: u64, extra_duration_ms: i64) -> Option<usize> {
        (0..self.segments.len()).find(|&i| self.contains(i, position_ms, extra_duration_ms))
    }

    /// Clamp an index into `[0, len - 1]` (0 for an empty timeline)
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.segments.len().saturating_sub(1))
    }
}
