/*!
 * Segment-repetition playback controller.
 *
 * The controller samples the player position on every `tick`, detects when a
 * subtitle segment is entered or finished, and issues play/pause/seek to the
 * player so that each segment is played `repetitions_per_segment` times with
 * a pause in between. User commands (pause, navigation, extra duration) are
 * applied between ticks on the same thread.
 *
 * State changes are published to the display adapter and segment changes are
 * written through to the progress store.
 */

use std::path::{Path, PathBuf};
use log::{debug, error, info, warn};

use crate::app_config::{JumpPolicy, PlaybackConfig};
use crate::clock::Clock;
use crate::display::{DisplayAdapter, DisplaySnapshot};
use crate::errors::PlayerError;
use crate::player::{Player, PlayerEvent};
use crate::progress::ProgressStore;
use crate::subtitle_processor::SubtitleEntry;
use crate::timeline::Timeline;

use super::commands::UserCommand;
use super::scheduler::{ScheduledAction, ScheduledEvent, Scheduler};
use super::state::{PausedFrom, PlaybackMode, TimelineState};

/// Lifecycle of the media behind the controller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Nothing opened yet
    #[default]
    Idle,
    /// Opened, waiting for the player to report ready
    Loading,
    /// Automatic logic runs on every tick
    Active,
    /// The player failed; ticks do nothing until the media is reloaded
    Failed(String),
    /// The media played to its end
    Ended,
}

// Where progress is written through to
#[derive(Debug)]
struct ProgressBinding {
    store: ProgressStore,
    video_path: PathBuf,
}

/// The segment-repetition state machine
pub struct PlaybackController<P: Player, C: Clock, D: DisplayAdapter> {
    config: PlaybackConfig,
    player: P,
    clock: C,
    display: D,
    state: TimelineState,
    scheduler: Scheduler,
    // Bumped by every user command; stale timers compare against it
    epoch: u64,
    status: SessionStatus,
    media: Option<PathBuf>,
    progress: Option<ProgressBinding>,
    last_position_ms: u64,
    last_snapshot: Option<DisplaySnapshot>,
}

impl<P: Player, C: Clock, D: DisplayAdapter> PlaybackController<P, C, D> {
    /// Create a controller over `segments`, starting at the configured segment
    pub fn new(config: PlaybackConfig, segments: Vec<SubtitleEntry>, player: P, clock: C, display: D) -> Self {
        let extra = config.initial_extra_duration_ms.max(config.extra_duration_min_ms);
        let state = TimelineState::new(Timeline::new(segments), config.start_segment_index, extra);

        Self {
            config,
            player,
            clock,
            display,
            state,
            scheduler: Scheduler::new(),
            epoch: 0,
            status: SessionStatus::Idle,
            media: None,
            progress: None,
            last_position_ms: 0,
            last_snapshot: None,
        }
    }

    /// Bind a progress store for `video_path` and resume from its saved segment
    pub fn with_progress<V: Into<PathBuf>>(mut self, store: ProgressStore, video_path: V) -> Self {
        let video_path = video_path.into();
        if let Some(saved) = store.lookup(&video_path) {
            let index = self.state.timeline.clamp_index(saved);
            if index != saved {
                warn!("Saved segment {} is out of range, using {}", saved, index);
            }
            self.state.set_current(index);
        }
        self.progress = Some(ProgressBinding { store, video_path });
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn repetition(&self) -> u32 {
        self.state.repetition
    }

    pub fn extra_duration_ms(&self) -> i64 {
        self.state.extra_duration_ms
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Number of timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Clock time at which the earliest pending timer fires
    pub fn next_timer_due_ms(&self) -> Option<u64> {
        self.scheduler.next_due_ms()
    }

    /// The media has played to its end
    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Ended
    }

    // =========================================================================
    // Media lifecycle
    // =========================================================================

    /// Open media and start playback. The resume seek happens on `Opened`.
    pub fn open(&mut self, media: &Path) -> Result<(), PlayerError> {
        self.media = Some(media.to_path_buf());
        self.epoch += 1;
        self.status = SessionStatus::Loading;
        // A reload keeps drilling the same segment from its start
        self.state.mode = if self.state.mode.is_drilling() && !self.state.is_complete() {
            PlaybackMode::InSegment
        } else {
            PlaybackMode::Normal
        };

        let result = self.player.open(media);
        match &result {
            Ok(()) => {
                info!("Opened {}", media.display());
                self.player.play();
            }
            Err(e) => self.fail(e.message().to_string()),
        }
        self.publish();
        result
    }

    /// Re-open the last media, keeping the segment and repetition count
    pub fn reload(&mut self) -> Result<(), PlayerError> {
        match self.media.clone() {
            Some(media) => self.open(&media),
            None => {
                debug!("Nothing to reload");
                Ok(())
            }
        }
    }

    /// React to a player notification
    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Opened => {
                self.status = SessionStatus::Active;
                if let Some(segment) = self.state.current_segment() {
                    let start = segment.start_time_ms;
                    debug!("Media opened, seeking to segment {} at {} ms", self.state.current_index + 1, start);
                    self.player.seek(start);
                }
            }
            PlayerEvent::Ended => {
                info!("Playback reached the end of the media");
                self.status = SessionStatus::Ended;
                self.save_progress();
            }
            PlayerEvent::Failed(message) => self.fail(message),
        }
        self.publish();
    }

    fn fail(&mut self, message: String) {
        if matches!(&self.status, SessionStatus::Failed(existing) if *existing == message) {
            return;
        }
        error!("Failed to load media: {}", message);
        self.status = SessionStatus::Failed(message);
    }

    fn drain_player_events(&mut self) {
        while let Some(event) = self.player.poll_event() {
            self.handle_player_event(event);
        }
    }

    // =========================================================================
    // Tick processing
    // =========================================================================

    /// Sample the position once and run the automatic transitions
    pub fn tick(&mut self) {
        self.drain_player_events();
        if self.status != SessionStatus::Active {
            return;
        }

        let now = self.clock.now_ms();
        for event in self.scheduler.take_due(now) {
            self.fire(event);
        }

        let position = self.player.position_ms();
        self.last_position_ms = position;

        match self.state.mode {
            PlaybackMode::Normal => self.detect_segment_entry(position),
            PlaybackMode::InSegment => self.check_segment_end(position),
            PlaybackMode::RepeatPause | PlaybackMode::SegmentPause | PlaybackMode::UserPaused { .. } => {}
        }

        self.publish();
    }

    fn detect_segment_entry(&mut self, position: u64) {
        let extra = self.state.extra_duration_ms;
        let current = self.state.current_index;
        let timeline = &self.state.timeline;

        // The segment we are positioned on wins over an earlier overlapping one
        let candidate = if timeline.contains(current, position, extra) {
            Some(current)
        } else {
            timeline.find_segment_at(position, extra)
        };

        if let Some(index) = candidate.filter(|&i| Some(i) != self.state.last_completed) {
            self.enter_segment(index);
        }
    }

    fn enter_segment(&mut self, index: usize) {
        self.state.set_current(index);
        self.state.mode = PlaybackMode::InSegment;
        info!("Entered subtitle segment {} / {}", index + 1, self.state.segment_count());
        self.save_progress();
    }

    fn check_segment_end(&mut self, position: u64) {
        let Some(end) = self.state.effective_segment_end_ms() else {
            // Past the last segment there is nothing to drill
            self.state.mode = PlaybackMode::Normal;
            return;
        };
        if position < end {
            return;
        }

        self.player.pause();
        self.state.repetition += 1;
        let now = self.clock.now_ms();
        let segment_number = self.state.current_index + 1;
        let count = self.state.segment_count();

        if self.state.repetition < self.config.repetitions_per_segment {
            self.state.mode = PlaybackMode::RepeatPause;
            info!(
                "Pausing before repeating segment {} / {} ({} of {} done)",
                segment_number, count, self.state.repetition, self.config.repetitions_per_segment
            );
            self.scheduler.schedule(
                now,
                self.config.repeat_delay_ms,
                ScheduledAction::RepeatResume,
                PlaybackMode::RepeatPause,
                self.epoch,
            );
        } else {
            self.state.mode = PlaybackMode::SegmentPause;
            info!("Pausing after completing segment {} / {}", segment_number, count);
            self.scheduler.schedule(
                now,
                self.config.segment_pause_ms,
                ScheduledAction::SegmentAdvance,
                PlaybackMode::SegmentPause,
                self.epoch,
            );
        }
        if let Some(due) = self.scheduler.next_due_ms() {
            debug!("Next timer due at {} ms (now {} ms)", due, now);
        }
    }

    fn fire(&mut self, event: ScheduledEvent) {
        if !event.is_current(self.state.mode, self.epoch) {
            debug!("Dropping stale {:?} timer (mode is {})", event.action, self.state.mode);
            return;
        }
        match event.action {
            ScheduledAction::RepeatResume => self.restart_segment(),
            ScheduledAction::SegmentAdvance => self.advance_segment(),
        }
    }

    fn restart_segment(&mut self) {
        if let Some(segment) = self.state.current_segment() {
            let start = segment.start_time_ms;
            self.player.seek(start);
        }
        self.player.play();
        self.state.mode = PlaybackMode::InSegment;
        debug!(
            "Repeating segment {} / {} (repetition {})",
            self.state.current_index + 1,
            self.state.segment_count(),
            self.state.repetition + 1
        );
    }

    fn advance_segment(&mut self) {
        let completed = self.state.current_index;
        self.state.last_completed = Some(completed);
        self.state.set_current(completed + 1);

        if let Some(segment) = self.state.current_segment() {
            let start = segment.start_time_ms;
            self.player.seek(start);
        } else {
            info!("All {} segments completed", self.state.segment_count());
        }
        self.player.play();
        self.state.mode = PlaybackMode::Normal;
        debug!("Continuing normal playback after segment {}", completed + 1);
        self.save_progress();
    }

    // =========================================================================
    // User commands
    // =========================================================================

    /// Apply a user command. Returns `false` when the session should stop.
    pub fn apply_command(&mut self, command: UserCommand) -> bool {
        match command {
            UserCommand::TogglePause => self.toggle_pause(),
            UserCommand::Pause => self.pause(),
            UserCommand::Resume => self.resume(),
            UserCommand::Next => self.next(),
            UserCommand::Previous => self.previous(),
            UserCommand::JumpTo(index) => self.jump_to(index),
            UserCommand::IncreaseExtra => self.increase_extra_duration(),
            UserCommand::DecreaseExtra => self.decrease_extra_duration(),
            UserCommand::Reload => {
                // Failures are already on the display
                let _ = self.reload();
            }
            UserCommand::Quit => return false,
        }
        true
    }

    /// Pause playback and suspend the automatic logic
    pub fn pause(&mut self) {
        if matches!(self.state.mode, PlaybackMode::UserPaused { .. }) {
            return;
        }
        self.epoch += 1;
        self.player.pause();
        self.state.mode = PlaybackMode::UserPaused { from: self.state.mode.into() };
        debug!("Paused by user at segment {}", self.state.current_index + 1);
        self.publish();
    }

    /// Resume after a user pause, completing any pause that was interrupted
    pub fn resume(&mut self) {
        let PlaybackMode::UserPaused { from } = self.state.mode else {
            return;
        };
        self.epoch += 1;
        match from {
            PausedFrom::Normal => {
                self.player.play();
                self.state.mode = PlaybackMode::Normal;
            }
            PausedFrom::InSegment => {
                self.player.play();
                self.state.mode = PlaybackMode::InSegment;
            }
            PausedFrom::RepeatPause => self.restart_segment(),
            PausedFrom::SegmentPause => self.advance_segment(),
        }
        debug!("Resumed by user in {} mode", self.state.mode);
        self.publish();
    }

    pub fn toggle_pause(&mut self) {
        if matches!(self.state.mode, PlaybackMode::UserPaused { .. }) {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Move to a segment and restart its repetitions. Out-of-range indexes are clamped.
    pub fn jump_to(&mut self, index: usize) {
        if self.state.timeline.is_empty() {
            return;
        }
        let index = self.state.timeline.clamp_index(index);

        self.epoch += 1;
        self.state.set_current(index);
        self.state.last_completed = None;
        self.state.mode = match self.config.jump_policy {
            JumpPolicy::Drill => PlaybackMode::InSegment,
            JumpPolicy::FreePlay => PlaybackMode::Normal,
        };

        if let Some(segment) = self.state.current_segment() {
            let start = segment.start_time_ms;
            self.player.seek(start);
        }
        if !self.player.is_playing() {
            self.player.play();
        }

        info!("Jumped to segment {} / {}", index + 1, self.state.segment_count());
        self.save_progress();
        self.publish();
    }

    pub fn next(&mut self) {
        self.jump_to(self.state.current_index + 1);
    }

    pub fn previous(&mut self) {
        self.jump_to(self.state.current_index.saturating_sub(1));
    }

    /// Shift the extra duration, never below the configured minimum
    pub fn adjust_extra_duration(&mut self, delta_ms: i64) {
        let updated = self
            .state
            .extra_duration_ms
            .saturating_add(delta_ms)
            .max(self.config.extra_duration_min_ms);
        self.state.extra_duration_ms = updated;
        info!("Extra duration is now {} ms", updated);
        self.publish();
    }

    pub fn increase_extra_duration(&mut self) {
        self.adjust_extra_duration(self.config.extra_duration_step_ms);
    }

    pub fn decrease_extra_duration(&mut self) {
        self.adjust_extra_duration(-self.config.extra_duration_step_ms);
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Write the current segment to the progress store, if one is bound
    pub fn save_progress(&self) {
        if let Some(binding) = &self.progress {
            binding.store.record_position(&binding.video_path, self.state.current_index);
        }
    }

    /// Current view for the display
    pub fn snapshot(&self) -> DisplaySnapshot {
        let text = if self.state.mode.is_drilling() {
            self.state.current_segment().map(|s| s.text.clone())
        } else {
            self.state
                .timeline
                .find_segment_at(self.last_position_ms, self.state.extra_duration_ms)
                .and_then(|i| self.state.timeline.get(i))
                .map(|s| s.text.clone())
        };

        let error = match &self.status {
            SessionStatus::Failed(message) => Some(message.clone()),
            _ => None,
        };

        DisplaySnapshot {
            text: text.unwrap_or_default(),
            segment_index: self.state.current_index,
            segment_count: self.state.segment_count(),
            repetition: self.state.repetition,
            repetitions_configured: self.config.repetitions_per_segment,
            mode: self.state.mode,
            extra_duration_ms: self.state.extra_duration_ms,
            error,
        }
    }

    // Render only when something visible changed
    fn publish(&mut self) {
        let snapshot = self.snapshot();
        if self.last_snapshot.as_ref() != Some(&snapshot) {
            self.display.render(&snapshot);
            self.last_snapshot = Some(snapshot);
        }
    }
}
