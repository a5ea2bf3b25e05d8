/*!
 * One-shot timers for the pauses between repetitions and segments.
 *
 * Timers are plain data fired by the controller's tick. Each carries the mode
 * it expects and the command epoch it was scheduled in, so a timer that was
 * overtaken by a user command turns into a no-op instead of being cancelled.
 */

use super::state::PlaybackMode;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Seek back to the segment start and play it again
    RepeatResume,
    /// Move to the next segment and resume free playback
    SegmentAdvance,
}

/// A pending one-shot timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub due_ms: u64,
    pub action: ScheduledAction,
    pub expected_mode: PlaybackMode,
    pub epoch: u64,
}

impl ScheduledEvent {
    /// Whether the controller is still in the state this timer was created for
    pub fn is_current(&self, mode: PlaybackMode, epoch: u64) -> bool {
        self.expected_mode == mode && self.epoch == epoch
    }
}

/// Pending timers ordered by due time
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<ScheduledEvent>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire `delay_ms` after `now_ms`
    pub fn schedule(
        &mut self,
        now_ms: u64,
        delay_ms: u64,
        action: ScheduledAction,
        expected_mode: PlaybackMode,
        epoch: u64,
    ) {
        let event = ScheduledEvent {
            due_ms: now_ms.saturating_add(delay_ms),
            action,
            expected_mode,
            epoch,
        };
        // Keep insertion order among timers due at the same time
        let pos = self.pending.partition_point(|e| e.due_ms <= event.due_ms);
        self.pending.insert(pos, event);
    }

    /// Remove and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: u64) -> Vec<ScheduledEvent> {
        let split = self.pending.partition_point(|e| e.due_ms <= now_ms);
        self.pending.drain(..split).collect()
    }

    /// Due time of the earliest pending timer
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.first().map(|e| e.due_ms)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
